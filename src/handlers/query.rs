use serde::Deserialize;

use crate::services::PageRequest;

/// Query string accepted by list endpoints.
///
/// Values are kept as strings and parsed leniently: anything that is not a
/// number is treated as absent, so `?size=abc` falls back to the default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub size: Option<String>,
    /// 1-based page number.
    pub offset: Option<String>,
    pub language_id: Option<String>,
    pub name: Option<String>,
    pub project_platform_id: Option<String>,
}

impl ListQuery {
    pub fn page(&self, default_size: i64) -> PageRequest {
        PageRequest::new(number(&self.size), number(&self.offset), default_size)
    }

    pub fn language_id(&self) -> Option<i64> {
        number(&self.language_id)
    }

    pub fn project_platform_id(&self) -> Option<i64> {
        number(&self.project_platform_id)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn number(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        let query = ListQuery {
            size: Some("abc".to_string()),
            offset: Some("2".to_string()),
            language_id: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(query.page(5), PageRequest { size: 5, page: 2 });
        assert_eq!(query.language_id(), None);
    }
}
