//! 诊断输出.
//!
//! 报告载波参数, 只用于观察, 不影响处理结果. 输出去向由注入的
//! [`DiagnosticSink`] 决定, 默认丢弃.

use std::io::Write;

use log::{info, warn};

use crate::generator::CarrierGenerator;

/// 诊断信息接收端
pub trait DiagnosticSink: Send {
    /// 接收一行诊断文本 (不含换行)
    fn line(&mut self, text: &str);
}

/// 丢弃所有诊断信息 (默认)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn line(&mut self, _text: &str) {}
}

/// 通过 `log` 门面以 info 级别输出
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn line(&mut self, text: &str) {
        info!("{text}");
    }
}

/// 写入任意 `io::Write` (如 stderr)
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 取回内部 writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "{text}") {
            warn!("写入诊断信息失败: {e}");
        }
    }
}

/// 载波参数报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierReport {
    /// 扫描线宽度 (像素)
    pub width: usize,
    /// 载波周期 (像素)
    pub period: f32,
    /// 占最高可表示频率的比例
    pub fraction_of_fmax: f32,
}

impl CarrierReport {
    pub fn from_generator(generator: &CarrierGenerator) -> Self {
        Self {
            width: generator.width(),
            period: generator.period(),
            fraction_of_fmax: generator.fraction_of_fmax(),
        }
    }

    /// 逐行输出到接收端
    pub fn emit(&self, sink: &mut dyn DiagnosticSink) {
        sink.line(&format!("Width: {} pixels", self.width));
        sink.line(&format!(
            "Carrier: period is {:.6} pixels ({:.6} of Fmax)",
            self.period, self.fraction_of_fmax,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lines() {
        let generator = CarrierGenerator::new(100).unwrap();
        let report = CarrierReport::from_generator(&generator);
        let mut sink = WriterSink::new(Vec::new());
        report.emit(&mut sink);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Width: 100 pixels");
        // 200 / 69 = 2.898551, 2 / 2.898551 = 0.690000
        assert_eq!(lines[1], "Carrier: period is 2.898551 pixels (0.690000 of Fmax)");
    }

    #[test]
    fn test_null_and_log_sinks_accept_lines() {
        let generator = CarrierGenerator::new(16).unwrap();
        let report = CarrierReport::from_generator(&generator);
        report.emit(&mut NullSink);
        let _ = env_logger::builder().is_test(true).try_init();
        report.emit(&mut LogSink);
    }
}
