// URL encoding for drilldown links

/// Characters `encodeURIComponent` leaves alone on top of the RFC 3986 unreserved set.
const UNRESERVED_MARKS: [char; 5] = ['!', '\'', '(', ')', '*'];

/// Percent-encode one query-string value the way `encodeURIComponent` does.
///
/// Letters, digits, `-_.~` and `!'()*` stay literal; every other byte of the
/// UTF-8 encoding becomes `%XX` with upper-case hex.
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find(UNRESERVED_MARKS) {
        out.push_str(&urlencoding::encode(&rest[..pos]));
        // marks are all ASCII
        out.push_str(&rest[pos..pos + 1]);
        rest = &rest[pos + 1..];
    }
    out.push_str(&urlencoding::encode(rest));
    out
}

/// Inverse of [`encode_component`]; invalid UTF-8 is replaced rather than rejected.
#[cfg(test)]
pub(crate) fn decode_component(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::decode(value).unwrap_or_else(|_| {
        let bytes = urlencoding::decode_binary(value.as_bytes());
        std::borrow::Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
    })
}

/// `/d/<uid>?var-<name>=<value>&...` link to another dashboard.
#[derive(Debug, Clone)]
pub struct DashboardUrl {
    url: String,
    has_params: bool,
}

impl DashboardUrl {
    pub fn new(uid: &str) -> Self {
        Self {
            url: format!("/d/{}", uid),
            has_params: false,
        }
    }

    /// Backend identifier (entity id, metric name), inserted as is.
    pub fn identifier(mut self, name: &str, value: &str) -> Self {
        self.push(name, value);
        self
    }

    /// Free text (title, legend, expression, unit), always encoded.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        let encoded = encode_component(value);
        self.push(name, &encoded);
        self
    }

    pub fn optional_text(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn finish(self) -> String {
        self.url
    }

    fn push(&mut self, name: &str, value: &str) {
        self.url.push(if self.has_params { '&' } else { '?' });
        self.url.push_str("var-");
        self.url.push_str(name);
        self.url.push('=');
        self.url.push_str(value);
        self.has_params = true;
    }
}

/// Split the query string of `url` into raw (still encoded) name/value pairs.
#[cfg(test)]
pub(crate) fn query_pairs(url: &str) -> Vec<(&str, &str)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_matches_encode_uri_component() {
        assert_eq!(encode_component("Batterie (SoC)"), "Batterie%20(SoC)");
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_component("Außentemperatur"), "Au%C3%9Fentemperatur");
        assert_eq!(encode_component("Erzeugung Σ"), "Erzeugung%20%CE%A3");
        assert_eq!(encode_component("it's *fine*!"), "it's%20*fine*!");
        assert_eq!(encode_component("100%"), "100%25");
        assert_eq!(encode_component("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_component(""), "");
    }

    #[test]
    fn test_encode_component_expression() {
        let expr = r#"{__name__="W_value"}[$__interval] / 1000"#;
        assert_eq!(
            encode_component(expr),
            "%7B__name__%3D%22W_value%22%7D%5B%24__interval%5D%20%2F%201000"
        );
    }

    #[test]
    fn test_round_trip() {
        for value in [
            "Batterie (SoC)",
            "a & b = c?",
            "Leistung abgeleitet (kW)",
            "100% / 50%",
            "(1 - scalar(x) / clamp_min(y, 1)) * 100",
            "Ø °C",
        ] {
            assert_eq!(decode_component(&encode_component(value)), value);
        }
    }

    #[test]
    fn test_dashboard_url() {
        let url = DashboardUrl::new("detail")
            .identifier("entity", "sensor_1")
            .text("title", "A & B")
            .optional_text("unit", None)
            .optional_text("legend", Some("x y"))
            .finish();

        assert_eq!(url, "/d/detail?var-entity=sensor_1&var-title=A%20%26%20B&var-legend=x%20y");
        assert_eq!(
            query_pairs(&url),
            vec![
                ("var-entity", "sensor_1"),
                ("var-title", "A%20%26%20B"),
                ("var-legend", "x%20y"),
            ]
        );
        assert!(query_pairs("/d/detail").is_empty());
    }
}
