// Query domain model

/// Reference to the backend a query or panel talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceRef {
    pub kind: String,
    pub uid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFormat {
    TimeSeries,
    Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub datasource: DatasourceRef,
    pub expr: String,
    pub legend: Option<String>,
    pub ref_id: Option<String>,
    pub format: Option<QueryFormat>,
}

impl Query {
    pub fn new(datasource: DatasourceRef, expr: impl Into<String>) -> Self {
        Self {
            datasource,
            expr: expr.into(),
            legend: None,
            ref_id: None,
            format: None,
        }
    }

    pub fn with_legend(mut self, legend: &str) -> Self {
        self.legend = Some(legend.to_string());
        self
    }

    pub fn with_ref_id(mut self, ref_id: &str) -> Self {
        self.ref_id = Some(ref_id.to_string());
        self
    }

    pub fn with_format(mut self, format: QueryFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// refId for the target at `index` when none is set: A, B, ..., Z, AA, AB, ...
pub fn default_ref_id(index: usize) -> String {
    let mut n = index;
    let mut id = Vec::new();
    loop {
        id.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    id.reverse();
    String::from_utf8_lossy(&id).into_owned()
}
