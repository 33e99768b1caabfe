pub mod lkps;
pub mod spreadsheet;
