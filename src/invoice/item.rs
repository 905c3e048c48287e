use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of a line item, unique within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

// Ids stored by other clients may be strings; those read as 0 and are
// reassigned by `LineItems::from_items`.
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Other(serde::de::IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => ItemId(n),
            Raw::Other(_) => ItemId(0),
        })
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One billable row of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default, alias = "showDesc", alias = "showDescription")]
    pub show_description: bool,
}

impl LineItem {
    fn blank(id: ItemId) -> Self {
        Self {
            id,
            name: String::new(),
            description: None,
            quantity: 1.0,
            unit_cost: 0.0,
            show_description: false,
        }
    }

    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_cost
    }

    /// Rows without a name are dropped from submissions.
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Editable field of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Description,
    Quantity,
    UnitCost,
}

impl std::str::FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "name" => Ok(ItemField::Name),
            "description" | "desc" => Ok(ItemField::Description),
            "quantity" | "qty" => Ok(ItemField::Quantity),
            "unit_cost" | "cost" | "rate" => Ok(ItemField::UnitCost),
            other => Err(format!(
                "unknown field '{other}' (expected name, description, quantity or unit-cost)"
            )),
        }
    }
}

/// Parse user input as a non-negative amount. The longest leading number is
/// used, so `"5abc"` is 5. No number, a negative one or a non-finite one
/// gives 0.
pub fn parse_amount(value: &str) -> f64 {
    match numeric_prefix(value.trim_start()).parse::<f64>() {
        Ok(n) if n.is_finite() => n.max(0.0),
        _ => 0.0,
    }
}

/// `[+-]digits[.digits][e[+-]digits]` at the start of `s`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut seen_digit = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if seen_digit || frac_end > end + 1 {
            seen_digit |= frac_end > end + 1;
            end = frac_end;
        }
    }
    if !seen_digit {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    &s[..end]
}

/// Ordered collection of line items. Never empty.
///
/// Each mutation swaps in a freshly built `Vec` and bumps `revision`, so a
/// caller holding an older revision can tell the rows changed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItems {
    items: Vec<LineItem>,
    next_id: u64,
    revision: u64,
}

impl Default for LineItems {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItems {
    /// A collection holding one blank row.
    pub fn new() -> Self {
        Self {
            items: vec![LineItem::blank(ItemId(1))],
            next_id: 2,
            revision: 0,
        }
    }

    /// Rebuild a collection from stored rows. Rows with a missing or duplicate
    /// id get a fresh one; an empty list yields one blank row.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        if items.is_empty() {
            return Self::new();
        }

        let mut next_id = items.iter().map(|i| i.id.0).max().unwrap_or(0) + 1;
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .map(|mut item| {
                if item.id.0 == 0 || !seen.insert(item.id) {
                    item.id = ItemId(next_id);
                    seen.insert(item.id);
                    next_id += 1;
                }
                item.quantity = item.quantity.max(0.0);
                item.unit_cost = item.unit_cost.max(0.0);
                item
            })
            .collect();

        Self {
            items,
            next_id,
            revision: 0,
        }
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Never true: the last row cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn replace(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.revision += 1;
    }

    /// Append a blank row and return its id.
    pub fn add_item(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;

        let mut items = self.items.clone();
        items.push(LineItem::blank(id));
        self.replace(items);
        id
    }

    /// Update one field of the row at `index`. Numeric fields go through
    /// [`parse_amount`]; text fields are stored as given.
    pub fn change_field(&mut self, index: usize, field: ItemField, value: &str) {
        if index >= self.items.len() {
            return;
        }

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i != index {
                    return item.clone();
                }
                let mut item = item.clone();
                match field {
                    ItemField::Name => item.name = value.to_string(),
                    ItemField::Description => item.description = Some(value.to_string()),
                    ItemField::Quantity => item.quantity = parse_amount(value),
                    ItemField::UnitCost => item.unit_cost = parse_amount(value),
                }
                item
            })
            .collect();
        self.replace(items);
    }

    /// Remove the row at `index`. The last remaining row is never removed.
    pub fn remove_item(&mut self, index: usize) -> bool {
        if self.items.len() <= 1 || index >= self.items.len() {
            return false;
        }

        let items = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item.clone())
            .collect();
        self.replace(items);
        true
    }

    pub fn toggle_description(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }

        let mut items = self.items.clone();
        items[index].show_description = !items[index].show_description;
        self.replace(items);
    }

    /// Show or hide the description of the row at `index`.
    pub fn set_show_description(&mut self, index: usize, show: bool) {
        if self.items.get(index).map_or(true, |item| item.show_description == show) {
            return;
        }

        let mut items = self.items.clone();
        items[index].show_description = show;
        self.replace(items);
    }

    /// Move the row at `from` to `to`, shifting the rows in between.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.items.len() {
            return;
        }
        let to = to.min(self.items.len() - 1);

        let mut items = self.items.clone();
        let moved = items.remove(from);
        items.insert(to, moved);
        self.replace(items);
    }
}

impl Serialize for LineItems {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LineItems {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<LineItem>::deserialize(deserializer).map(LineItems::from_items)
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_items() -> LineItems {
        let mut items = LineItems::new();
        items.add_item();
        items.add_item();
        items.change_field(0, ItemField::Name, "a");
        items.change_field(1, ItemField::Name, "b");
        items.change_field(2, ItemField::Name, "c");
        items
    }

    fn names(items: &LineItems) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn new_collection_has_one_default_row() {
        let items = LineItems::new();
        assert_eq!(items.len(), 1);
        let row = items.get(0).unwrap();
        assert_eq!(row.quantity, 1.0);
        assert_eq!(row.unit_cost, 0.0);
        assert!(row.name.is_empty());
        assert!(!row.show_description);
    }

    #[test]
    fn add_item_allocates_unique_ids() {
        let mut items = LineItems::new();
        let a = items.add_item();
        let b = items.add_item();
        assert_ne!(a, b);
        let ids: HashSet<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn quantity_is_parsed_and_clamped() {
        let mut items = LineItems::new();
        items.change_field(0, ItemField::Quantity, "2.5");
        assert_eq!(items.get(0).unwrap().quantity, 2.5);

        items.change_field(0, ItemField::Quantity, "-3");
        assert_eq!(items.get(0).unwrap().quantity, 0.0);

        items.change_field(0, ItemField::Quantity, "abc");
        assert_eq!(items.get(0).unwrap().quantity, 0.0);

        items.change_field(0, ItemField::UnitCost, " 12.75 ");
        assert_eq!(items.get(0).unwrap().unit_cost, 12.75);

        items.change_field(0, ItemField::UnitCost, "");
        assert_eq!(items.get(0).unwrap().unit_cost, 0.0);

        items.change_field(0, ItemField::UnitCost, "NaN");
        assert_eq!(items.get(0).unwrap().unit_cost, 0.0);
    }

    #[test]
    fn leading_number_is_kept_like_a_form_field() {
        assert_eq!(parse_amount("5abc"), 5.0);
        assert_eq!(parse_amount(" 12.5kg"), 12.5);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("3."), 3.0);
        assert_eq!(parse_amount("1e3 units"), 1000.0);
        assert_eq!(parse_amount("2e"), 2.0);
        assert_eq!(parse_amount("-4x"), 0.0);
        assert_eq!(parse_amount("x5"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
        assert_eq!(parse_amount("1e999"), 0.0);
    }

    #[test]
    fn set_show_description_is_idempotent() {
        let mut items = LineItems::new();
        items.set_show_description(0, true);
        let rev = items.revision();
        items.set_show_description(0, true);
        assert!(items.get(0).unwrap().show_description);
        assert_eq!(items.revision(), rev);

        items.set_show_description(0, false);
        assert!(!items.get(0).unwrap().show_description);
        items.set_show_description(9, true);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn text_fields_are_stored_verbatim() {
        let mut items = LineItems::new();
        items.change_field(0, ItemField::Name, "  Design work ");
        items.change_field(0, ItemField::Description, "Two rounds");
        let row = items.get(0).unwrap();
        assert_eq!(row.name, "  Design work ");
        assert_eq!(row.description.as_deref(), Some("Two rounds"));
    }

    #[test]
    fn last_item_cannot_be_removed() {
        let mut items = LineItems::new();
        let before = items.revision();
        assert!(!items.remove_item(0));
        assert_eq!(items.len(), 1);
        assert_eq!(items.revision(), before);
    }

    #[test]
    fn remove_item_drops_only_that_row() {
        let mut items = three_items();
        assert!(items.remove_item(1));
        assert_eq!(names(&items), ["a", "c"]);
        assert!(!items.remove_item(5));
    }

    #[test]
    fn reorder_is_a_stable_move() {
        let mut items = three_items();
        let before: HashSet<_> = items.iter().map(|i| i.id).collect();

        items.reorder(0, 2);
        assert_eq!(names(&items), ["b", "c", "a"]);

        items.reorder(2, 0);
        assert_eq!(names(&items), ["a", "b", "c"]);

        items.reorder(1, 99);
        assert_eq!(names(&items), ["a", "c", "b"]);

        let after: HashSet<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn toggle_description_leaves_amounts_alone() {
        let mut items = LineItems::new();
        items.change_field(0, ItemField::UnitCost, "10");
        items.toggle_description(0);
        assert!(items.get(0).unwrap().show_description);
        assert_eq!(items.get(0).unwrap().amount(), 10.0);
        items.toggle_description(0);
        assert!(!items.get(0).unwrap().show_description);
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let mut items = LineItems::new();
        let r0 = items.revision();
        items.add_item();
        let r1 = items.revision();
        items.change_field(1, ItemField::Name, "x");
        let r2 = items.revision();
        items.reorder(0, 1);
        let r3 = items.revision();
        assert!(r0 < r1 && r1 < r2 && r2 < r3);
    }

    #[test]
    fn from_items_repairs_missing_and_duplicate_ids() {
        let row = |id: u64, name: &str| LineItem {
            id: ItemId(id),
            name: name.to_string(),
            description: None,
            quantity: 1.0,
            unit_cost: 0.0,
            show_description: false,
        };
        let mut items = LineItems::from_items(vec![row(0, "a"), row(4, "b"), row(4, "c")]);
        let ids: HashSet<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&ItemId(0)));

        let fresh = items.add_item();
        assert!(!ids.contains(&fresh));

        assert_eq!(LineItems::from_items(Vec::new()).len(), 1);
    }

    #[test]
    fn item_field_parses_cli_spellings() {
        assert_eq!("qty".parse::<ItemField>(), Ok(ItemField::Quantity));
        assert_eq!("unit-cost".parse::<ItemField>(), Ok(ItemField::UnitCost));
        assert_eq!("Name".parse::<ItemField>(), Ok(ItemField::Name));
        assert!("price_tag".parse::<ItemField>().is_err());
    }
}
