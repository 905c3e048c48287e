mod form;
mod gesture;
mod item;
mod totals;

pub use form::{
    AdjustmentKind, InvoiceData, InvoiceForm, InvoicePayload, PayloadItem, SaveInvoiceRequest,
    SavedInvoice, LOGO_LOCAL_ONLY, LOGO_UPLOADED, MISSING_PARTIES, NO_VALID_ITEMS,
};
pub use gesture::{SwipeState, SwipeToDelete, MAX_OFFSET, THRESHOLD};
pub use item::{parse_amount, ItemField, ItemId, LineItem, LineItems};
pub use totals::{Adjustment, Adjustments, InvoiceTotals, Toggle, Zeroed};
