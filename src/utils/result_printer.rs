//! 分类结果输出
//! 调试视图每行 "<整数>: <标签串>"，紧凑视图每行 "<标签串>"，均按整数升序

use std::io::{self, Write};

use numclass_engine::ClassificationResult;

/// 结果输出工具
pub struct ResultPrinter;

impl ResultPrinter {
    /// 写出到任意 io::Write
    pub fn write_to<W: Write>(result: &ClassificationResult, debug: bool, out: &mut W) -> io::Result<()> {
        if debug {
            for (number, labels) in result.by_number() {
                writeln!(out, "{}: {}", number, labels)?;
            }
        } else {
            for labels in result.ordered() {
                writeln!(out, "{}", labels)?;
            }
        }
        Ok(())
    }

    /// 写出到标准输出（加锁一次）
    pub fn print(result: &ClassificationResult, debug: bool) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        Self::write_to(result, debug, &mut handle)?;
        handle.flush()
    }

    /// 渲染为字符串
    pub fn render(result: &ClassificationResult, debug: bool) -> String {
        let mut buffer = Vec::new();
        // 写入 Vec 不会失败
        let _ = Self::write_to(result, debug, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
