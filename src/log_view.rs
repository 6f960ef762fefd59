use crate::constants::LOG_BACKLOG;

#[derive(Debug)]
pub struct LogView {
    pub entries: Vec<String>,
    pub scroll_offset: u16,
}

impl LogView {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll_offset: 0,
        }
    }

    pub fn add(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > LOG_BACKLOG {
            self.entries.remove(0);
        }
    }
}
