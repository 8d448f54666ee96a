/// End-of-run summary of what was staged onto the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    device: String,
    lines: Vec<String>,
}

impl Report {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            lines: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.lines.push(message.into());
    }

    pub fn render(&self) -> String {
        let mut out = format!("\n{}:\n", self.device);
        for line in &self.lines {
            out.push_str("  - ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
