// Link domain model (panel data links and dashboard links share one shape)

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLink {
    pub title: String,
    pub url: String,
    pub keep_time: bool,
    pub include_vars: bool,
    pub icon: Option<String>,
}

impl DataLink {
    pub fn new(title: &str, url: String) -> Self {
        Self {
            title: title.to_string(),
            url,
            keep_time: false,
            include_vars: false,
            icon: None,
        }
    }

    pub fn keep_time(mut self, keep: bool) -> Self {
        self.keep_time = keep;
        self
    }

    pub fn include_vars(mut self, include: bool) -> Self {
        self.include_vars = include;
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}
