//! 通用工具
pub mod result_printer;

pub use self::result_printer::ResultPrinter;
