use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use invoicer::api::{ApiClient, Client, DashboardData, LogoUpload};
use invoicer::config::{
    clear_draft, config_dir, load_config, load_draft, resolve_output_dir, save_draft, Config,
    Draft, CONFIG_TEMPLATE, CURRENCIES,
};
use invoicer::error::{InvoiceError, Result};
use invoicer::invoice::{Adjustment, InvoiceForm, ItemField, SavedInvoice, Toggle};
use invoicer::{logging, AppContext, Session};

#[derive(Parser)]
#[command(name = "invoicer")]
#[command(version, about = "Build invoices and send them to your invoice server", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.invoicer or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log requests and draft writes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the invoice being edited, with totals
    Show,

    /// Discard the current draft and start a new invoice
    New,

    /// Set invoice details
    Set(SetArgs),

    /// Append a line item
    AddItem {
        /// Item name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Quantity (default: 1)
        #[arg(short, long)]
        qty: Option<String>,

        /// Unit cost
        #[arg(short, long)]
        cost: Option<String>,

        /// Optional description shown under the item
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change one field of a line item
    EditItem {
        /// Item position from 'show' (1-based)
        index: usize,

        /// name, description, quantity or unit-cost
        field: ItemField,

        value: String,
    },

    /// Remove a line item (the last one is always kept)
    RemoveItem {
        /// Item position from 'show' (1-based)
        index: usize,
    },

    /// Move a line item to another position
    MoveItem {
        /// Current position (1-based)
        from: usize,

        /// New position (1-based)
        to: usize,
    },

    /// Show or hide an item's description
    ToggleDescription {
        /// Item position from 'show' (1-based)
        index: usize,
    },

    /// Configure tax
    Tax(AdjustArgs),

    /// Configure discount
    Discount(AdjustArgs),

    /// Configure shipping
    Shipping {
        /// Flat shipping amount
        value: Option<String>,

        /// Stop charging shipping
        #[arg(long, conflicts_with = "value")]
        off: bool,
    },

    /// List currencies, or pick one for this invoice
    Currency {
        /// Currency code (e.g. EUR)
        code: Option<String>,
    },

    /// Upload a logo, or remove it
    Logo {
        /// Image file to upload
        #[arg(required_unless_present = "remove")]
        path: Option<PathBuf>,

        #[arg(long, conflicts_with = "path")]
        remove: bool,
    },

    /// Generate the PDF and save it
    Generate {
        /// Custom output file path (default: output_dir/invoice-<to>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Render a preview of the invoice
    Preview {
        /// Custom output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave the total out of the request
        #[arg(long)]
        no_total: bool,

        /// Open the preview with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Save the invoice to your account (updates it if saved before)
    Save {
        /// Client to attach the invoice to: index from 'clients' or client id
        #[arg(long)]
        client: Option<String>,
    },

    /// List your clients
    Clients,

    /// Add a client to your account
    AddClient {
        /// Client name
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// List invoices saved to your account
    Invoices,

    /// Load a saved invoice into the draft
    Load {
        /// Index from 'invoices' (e.g., 1) or invoice id
        invoice: String,
    },

    /// Show account dashboard
    Dashboard {
        /// Only show invoices whose client or number matches
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show subscription status
    Subscription,

    /// Start a subscription checkout
    Subscribe {
        /// Open the checkout page in the browser
        #[arg(long)]
        open: bool,
    },
}

#[derive(Args)]
struct SetArgs {
    /// Sender block
    #[arg(long)]
    from: Option<String>,

    /// Recipient block
    #[arg(long)]
    to: Option<String>,

    /// Invoice number
    #[arg(long)]
    number: Option<String>,

    /// Issue date (YYYY-MM-DD); fills the due date from config when unset
    #[arg(long, value_parser = parse_date)]
    issued: Option<NaiveDate>,

    /// Due date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    due: Option<NaiveDate>,

    /// Payment details (bank, account, ...)
    #[arg(long)]
    payment_details: Option<String>,

    /// Payment instructions
    #[arg(long)]
    instructions: Option<String>,

    /// Terms and notes
    #[arg(long)]
    terms: Option<String>,
}

#[derive(Args)]
struct AdjustArgs {
    /// Amount; percent or flat depending on the current mode
    value: Option<String>,

    /// Treat the value as a percentage of the subtotal
    #[arg(long, conflicts_with = "fixed")]
    percent: bool,

    /// Treat the value as a flat amount
    #[arg(long)]
    fixed: bool,

    /// Switch this adjustment off (the value is remembered)
    #[arg(long, conflicts_with_all = ["value", "percent", "fixed"])]
    off: bool,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Show => cmd_show(&cfg_dir),
        Commands::New => cmd_new(&cfg_dir),
        Commands::Set(args) => cmd_set(&cfg_dir, args),
        Commands::AddItem {
            name,
            qty,
            cost,
            description,
        } => cmd_add_item(&cfg_dir, name, qty, cost, description),
        Commands::EditItem {
            index,
            field,
            value,
        } => edit_draft(&cfg_dir, |_, draft| {
            let i = item_index(&draft.form, index)?;
            draft.form.items.change_field(i, field, &value);
            println!("Updated item {index}");
            Ok(())
        }),
        Commands::RemoveItem { index } => edit_draft(&cfg_dir, |_, draft| {
            let i = item_index(&draft.form, index)?;
            if draft.form.items.remove_item(i) {
                println!("Removed item {index}");
            } else {
                println!("An invoice needs at least one item; the last item was kept.");
            }
            Ok(())
        }),
        Commands::MoveItem { from, to } => edit_draft(&cfg_dir, |_, draft| {
            let i = item_index(&draft.form, from)?;
            draft.form.items.reorder(i, to.saturating_sub(1));
            println!("Moved item {from} to position {}", to.clamp(1, draft.form.items.len()));
            Ok(())
        }),
        Commands::ToggleDescription { index } => edit_draft(&cfg_dir, |_, draft| {
            let i = item_index(&draft.form, index)?;
            draft.form.items.toggle_description(i);
            Ok(())
        }),
        Commands::Tax(args) => edit_draft(&cfg_dir, |_, draft| {
            adjust(&mut draft.form.adjustments.tax, &args);
            println!("Tax: {}", describe(&draft.form.adjustments.tax));
            Ok(())
        }),
        Commands::Discount(args) => edit_draft(&cfg_dir, |_, draft| {
            adjust(&mut draft.form.adjustments.discount, &args);
            println!("Discount: {}", describe(&draft.form.adjustments.discount));
            Ok(())
        }),
        Commands::Shipping { value, off } => edit_draft(&cfg_dir, |_, draft| {
            let shipping = &mut draft.form.adjustments.shipping;
            shipping.set_enabled(!off);
            if let Some(v) = value {
                shipping.value = invoicer::invoice::parse_amount(&v);
            }
            if shipping.enabled {
                println!("Shipping: {:.2}", shipping.value);
            } else {
                println!("Shipping: off");
            }
            Ok(())
        }),
        Commands::Currency { code } => cmd_currency(&cfg_dir, code),
        Commands::Logo { path, remove } => cmd_logo(&cfg_dir, path, remove),
        Commands::Generate { output, open } => cmd_generate(&cfg_dir, output, open),
        Commands::Preview {
            output,
            no_total,
            open,
        } => cmd_preview(&cfg_dir, output, !no_total, open),
        Commands::Save { client } => cmd_save(&cfg_dir, client),
        Commands::Clients => cmd_clients(&cfg_dir),
        Commands::AddClient {
            name,
            email,
            address,
            phone,
        } => cmd_add_client(&cfg_dir, name, email, address, phone),
        Commands::Invoices => cmd_invoices(&cfg_dir),
        Commands::Load { invoice } => cmd_load(&cfg_dir, &invoice),
        Commands::Dashboard { search } => cmd_dashboard(&cfg_dir, search),
        Commands::Subscription => cmd_subscription(&cfg_dir),
        Commands::Subscribe { open } => cmd_subscribe(&cfg_dir, open),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(InvoiceError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized invoicer config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point at your invoice server:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Fill in the parties:           invoicer set --from \"...\" --to \"...\"");
    println!("  3. Add line items:                invoicer add-item --name Consulting --qty 8 --cost 150");
    println!();
    println!("Then download the PDF:");
    println!("  invoicer generate");

    Ok(())
}

/// Load config and draft, failing early if init has not run
fn open_workspace(cfg_dir: &Path) -> Result<(Config, Draft)> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let config = load_config(cfg_dir)?;
    let draft = load_draft(cfg_dir)?;
    Ok((config, draft))
}

fn open_session(cfg_dir: &Path) -> Result<(Config, Draft, Session)> {
    let (config, mut draft) = open_workspace(cfg_dir)?;
    let ctx = config.context(draft.currency.as_deref())?;
    let api = ApiClient::from_settings(&config.api);
    let form = std::mem::take(&mut draft.form);
    Ok((config, draft, Session::new(ctx, form, api)))
}

/// Apply an edit to the draft and write it back
fn edit_draft<F>(cfg_dir: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&Config, &mut Draft) -> Result<()>,
{
    let (config, mut draft) = open_workspace(cfg_dir)?;
    edit(&config, &mut draft)?;
    save_draft(cfg_dir, &draft)
}

/// Convert a 1-based position from the CLI into an index
fn item_index(form: &InvoiceForm, position: usize) -> Result<usize> {
    let count = form.items.len();
    if position == 0 || position > count {
        return Err(InvoiceError::InvalidItemIndex {
            index: position,
            count,
        });
    }
    Ok(position - 1)
}

fn adjust(toggle: &mut Toggle<Adjustment>, args: &AdjustArgs) {
    if args.off {
        toggle.set_enabled(false);
        return;
    }
    toggle.set_enabled(true);

    let wants_switch = (args.fixed && toggle.value.is_percent())
        || (args.percent && !toggle.value.is_percent());
    if wants_switch {
        toggle.value = toggle.value.switch_kind();
    }
    if let Some(v) = &args.value {
        toggle.value = toggle.value.with_input(v);
    }
}

fn describe(toggle: &Toggle<Adjustment>) -> String {
    match toggle.active() {
        Some(a) => a.to_string(),
        None => "off".to_string(),
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ITEM")]
    name: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "UNIT COST")]
    unit_cost: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct SavedRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "TO")]
    to: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "INVOICES")]
    invoices: u64,
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DUE")]
    due: String,
}

#[derive(Tabled)]
struct CurrencyRow {
    #[tabled(rename = "CODE")]
    code: &'static str,
    #[tabled(rename = "SYMBOL")]
    symbol: &'static str,
    #[tabled(rename = "NAME")]
    label: &'static str,
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Show the draft invoice
fn cmd_show(cfg_dir: &Path) -> Result<()> {
    let (config, draft) = open_workspace(cfg_dir)?;
    let ctx = config.context(draft.currency.as_deref())?;
    let form = &draft.form;

    println!("Invoice {}", or_dash(&form.invoice_number));
    println!("{}", "-".repeat(50));
    println!("From:      {}", or_dash(&first_line(&form.from)));
    println!("To:        {}", or_dash(&first_line(&form.to)));
    println!("Issued:    {}", format_date(form.issued_date));
    println!("Due:       {}", format_date(form.due_date));
    println!("Currency:  {}", ctx.currency);
    if form.logo_url.is_some() || form.logo_file.is_some() {
        println!("Logo:      {}", or_dash(&form.logo_status));
    }
    println!();

    let rows: Vec<ItemRow> = form
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut name = or_dash(&item.name).to_string();
            if item.show_description {
                if let Some(desc) = item.description.as_deref().filter(|d| !d.is_empty()) {
                    name = format!("{name}\n  {desc}");
                }
            }
            ItemRow {
                index: i + 1,
                name,
                quantity: format!("{}", item.quantity),
                unit_cost: ctx.money(item.unit_cost),
                amount: ctx.money(item.amount()),
            }
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let totals = form.totals();
    let adj = &form.adjustments;
    println!("Subtotal:  {}", ctx.money(totals.subtotal));
    if let Some(tax) = adj.tax.active() {
        println!("Tax ({tax}):  {}", ctx.money(totals.tax_amount));
    }
    if let Some(discount) = adj.discount.active() {
        println!("Discount ({discount}):  -{}", ctx.money(totals.discount_amount));
    }
    if adj.shipping.active().is_some() {
        println!("Shipping:  {}", ctx.money(totals.shipping_amount));
    }
    println!("Total:     {}", ctx.money(totals.total));

    Ok(())
}

fn cmd_new(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    clear_draft(cfg_dir)?;
    println!("Started a new invoice.");
    Ok(())
}

fn cmd_set(cfg_dir: &Path, args: SetArgs) -> Result<()> {
    edit_draft(cfg_dir, |config, draft| {
        let form = &mut draft.form;
        if let Some(v) = args.from {
            form.from = v;
        }
        if let Some(v) = args.to {
            form.to = v;
        }
        if let Some(v) = args.number {
            form.invoice_number = v;
        }
        if let Some(d) = args.due {
            form.due_date = Some(d);
        }
        if let Some(d) = args.issued {
            form.set_issued_date(d, config.invoice.due_days);
        }
        if let Some(v) = args.payment_details {
            form.payment_details = v;
        }
        if let Some(v) = args.instructions {
            form.payment_instructions = v;
        }
        if let Some(v) = args.terms {
            form.terms = v;
        }
        println!("Invoice details updated.");
        Ok(())
    })
}

fn cmd_add_item(
    cfg_dir: &Path,
    name: String,
    qty: Option<String>,
    cost: Option<String>,
    description: Option<String>,
) -> Result<()> {
    edit_draft(cfg_dir, |_, draft| {
        let items = &mut draft.form.items;

        // A fresh draft starts with one blank row; fill that before appending.
        let reuse_blank = items.len() == 1
            && items
                .get(0)
                .is_some_and(|i| !i.is_named() && i.unit_cost == 0.0);
        let index = if reuse_blank {
            0
        } else {
            items.add_item();
            items.len() - 1
        };

        items.change_field(index, ItemField::Name, &name);
        if let Some(q) = qty {
            items.change_field(index, ItemField::Quantity, &q);
        }
        if let Some(c) = cost {
            items.change_field(index, ItemField::UnitCost, &c);
        }
        if let Some(d) = description {
            items.change_field(index, ItemField::Description, &d);
            items.set_show_description(index, true);
        }
        println!("Added item {}", index + 1);
        Ok(())
    })
}

fn cmd_currency(cfg_dir: &Path, code: Option<String>) -> Result<()> {
    let Some(code) = code else {
        let rows: Vec<CurrencyRow> = CURRENCIES
            .iter()
            .map(|c| CurrencyRow {
                code: c.code,
                symbol: c.symbol,
                label: c.label,
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
        return Ok(());
    };

    edit_draft(cfg_dir, |_, draft| {
        let ctx = AppContext::default().with_currency(&code)?;
        draft.currency = Some(ctx.currency.code.to_string());
        println!("Currency: {}", ctx.currency);
        Ok(())
    })
}

fn cmd_logo(cfg_dir: &Path, path: Option<PathBuf>, remove: bool) -> Result<()> {
    let (_, mut draft, mut session) = open_session(cfg_dir)?;

    match path {
        Some(path) if !remove => {
            if !path.exists() {
                return Err(InvoiceError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("logo file not found: {}", path.display()),
                )));
            }
            match session.upload_logo(&path) {
                LogoUpload::Hosted { logo_url } => println!("Logo uploaded: {logo_url}"),
                LogoUpload::LocalOnly { reason } => {
                    println!("{} ({reason})", session.form.logo_status)
                }
            }
        }
        _ => {
            session.form.clear_logo();
            println!("Logo removed.");
        }
    }

    draft.form = session.form;
    save_draft(cfg_dir, &draft)
}

fn cmd_generate(cfg_dir: &Path, output: Option<PathBuf>, open: bool) -> Result<()> {
    let (config, _, mut session) = open_session(cfg_dir)?;
    let out_dir = resolve_output_dir(&config.output.dir, cfg_dir);

    let path = session.download(&out_dir, output)?;
    let totals = session.form.totals();

    println!("Generated {}", or_dash(&session.form.invoice_number));
    println!("  To:     {}", first_line(&session.form.to));
    println!("  Total:  {}", session.context.money(totals.total));
    println!("  Saved:  {}", path.display());

    if open {
        open_path(&path)?;
    }
    Ok(())
}

fn cmd_preview(cfg_dir: &Path, output: Option<PathBuf>, include_total: bool, open: bool) -> Result<()> {
    let (config, _, mut session) = open_session(cfg_dir)?;
    let preview = session.preview(include_total)?;

    let path = match output {
        Some(p) => p,
        None => {
            let out_dir = resolve_output_dir(&config.output.dir, cfg_dir);
            std::fs::create_dir_all(&out_dir)?;
            let stem = session.form.download_filename();
            let stem = stem.trim_end_matches(".pdf");
            out_dir.join(format!("preview-{stem}.{}", preview.extension()))
        }
    };
    std::fs::write(&path, preview.bytes())?;
    println!("Preview written to {}", path.display());

    if open {
        open_path(&path)?;
    }
    Ok(())
}

fn cmd_save(cfg_dir: &Path, client: Option<String>) -> Result<()> {
    let (_, mut draft, mut session) = open_session(cfg_dir)?;

    let client_id = match client {
        Some(reference) => Some(find_client(session.clients()?, &reference)?.id),
        None => None,
    };
    let updating = session.form.saved_id.is_some();

    let id = session.save(client_id)?;
    match (id, updating) {
        (Some(id), true) => println!("Invoice updated ({id})"),
        (Some(id), false) => println!("Invoice saved ({id})"),
        (None, _) => println!("Invoice saved"),
    }
    draft.form = session.form;
    save_draft(cfg_dir, &draft)
}

/// Resolve a client reference: 1-based index from 'clients' or an id
fn find_client(clients: Vec<Client>, reference: &str) -> Result<Client> {
    if let Ok(idx) = reference.parse::<usize>() {
        if idx >= 1 && idx <= clients.len() {
            return Ok(clients[idx - 1].clone());
        }
    }
    clients
        .into_iter()
        .find(|c| c.id == reference)
        .ok_or_else(|| InvoiceError::ClientNotFound(reference.to_string()))
}

fn cmd_clients(cfg_dir: &Path) -> Result<()> {
    let (_, _, mut session) = open_session(cfg_dir)?;
    let clients = session.clients()?;

    if clients.is_empty() {
        println!("No clients yet. Add one with 'invoicer add-client <name>'.");
        return Ok(());
    }

    let rows: Vec<ClientRow> = clients
        .iter()
        .enumerate()
        .map(|(i, c)| ClientRow {
            index: i + 1,
            id: c.id.clone(),
            name: c.name.clone(),
            email: c.email.clone().unwrap_or_else(|| "-".to_string()),
            invoices: c.invoice_count,
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("Use 'invoicer save --client <#>' to attach one.");
    Ok(())
}

fn cmd_add_client(
    cfg_dir: &Path,
    name: String,
    email: Option<String>,
    address: Option<String>,
    phone: Option<String>,
) -> Result<()> {
    let (_, _, mut session) = open_session(cfg_dir)?;
    let client = session.add_client(name, email, address, phone)?;
    println!("Added client {} ({})", client.name, client.id);
    Ok(())
}

fn saved_total(invoice: &SavedInvoice) -> f64 {
    InvoiceForm::from_saved(invoice.clone()).totals().total
}

fn cmd_invoices(cfg_dir: &Path) -> Result<()> {
    let (_, _, mut session) = open_session(cfg_dir)?;
    let invoices = session.saved_invoices()?;

    if invoices.is_empty() {
        println!("No saved invoices yet.");
        return Ok(());
    }

    let rows: Vec<SavedRow> = invoices
        .iter()
        .enumerate()
        .map(|(i, inv)| SavedRow {
            index: i + 1,
            id: inv.id.clone(),
            number: or_dash(&inv.data.invoice_number).to_string(),
            to: or_dash(&first_line(&inv.data.to)).to_string(),
            total: session.context.money(saved_total(inv)),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("Use 'invoicer load <#>' to edit one.");
    Ok(())
}

/// Resolve an invoice reference: 1-based index from 'invoices' or an id
fn find_saved(invoices: Vec<SavedInvoice>, reference: &str) -> Result<SavedInvoice> {
    if let Ok(idx) = reference.parse::<usize>() {
        if idx >= 1 && idx <= invoices.len() {
            return Ok(invoices[idx - 1].clone());
        }
    }
    invoices
        .into_iter()
        .find(|inv| inv.id == reference)
        .ok_or_else(|| InvoiceError::InvoiceNotFound(reference.to_string()))
}

fn cmd_load(cfg_dir: &Path, reference: &str) -> Result<()> {
    let (_, mut draft, mut session) = open_session(cfg_dir)?;
    let invoice = find_saved(session.saved_invoices()?, reference)?;
    let id = invoice.id.clone();
    session.load(invoice);

    println!("Loaded invoice {id} ({} item(s))", session.form.items.len());
    draft.form = session.form;
    save_draft(cfg_dir, &draft)
}

fn cmd_dashboard(cfg_dir: &Path, search: Option<String>) -> Result<()> {
    let (_, _, session) = open_session(cfg_dir)?;
    let data: DashboardData = session.api().dashboard()?;
    let ctx = &session.context;
    let stats = &data.stats;

    println!("Dashboard");
    println!("{}", "-".repeat(50));
    println!("Revenue:          {}", ctx.money(stats.total_revenue));
    println!("Pending:          {}", ctx.money(stats.pending_amount));
    println!("Invoices:         {}", stats.total_invoices);
    println!("Clients:          {}", stats.total_clients);
    println!("Paid:             {}", stats.paid_invoices);
    println!("Overdue:          {}", stats.overdue_invoices);
    println!("Monthly growth:   {:.1}%", stats.monthly_growth);
    println!();

    let recent = data.search(search.as_deref().unwrap_or(""));
    if recent.is_empty() {
        println!("No matching invoices.");
        return Ok(());
    }

    let rows: Vec<RecentRow> = recent
        .into_iter()
        .map(|inv| RecentRow {
            number: inv.invoice_number.clone(),
            client: inv.client_name.clone(),
            amount: ctx.money(inv.amount),
            status: inv.status.to_string(),
            due: or_dash(&inv.due_date).to_string(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

fn cmd_subscription(cfg_dir: &Path) -> Result<()> {
    let (_, _, session) = open_session(cfg_dir)?;
    let user = session.context.require_user()?;
    let status = session.api().subscription_status(user)?;
    println!(
        "Subscription: {}",
        status.subscription_status.as_deref().unwrap_or("none")
    );
    if !status.is_active() {
        println!("Run 'invoicer subscribe' to upgrade.");
    }
    Ok(())
}

fn cmd_subscribe(cfg_dir: &Path, open: bool) -> Result<()> {
    let (_, _, session) = open_session(cfg_dir)?;
    let checkout = session.api().create_checkout_session()?;
    println!("Complete your subscription at:");
    println!("  {}", checkout.url);
    if open {
        open_path(&checkout.url)?;
    }
    Ok(())
}

fn open_path<P: AsRef<OsStr>>(target: P) -> Result<()> {
    let target = target.as_ref();

    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(target).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(target).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args([OsStr::new("/C"), OsStr::new("start"), OsStr::new(""), target])
            .spawn()?;
    }
    Ok(())
}
