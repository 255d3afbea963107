use paywire_common::form::{append_field, Filters, FormEncode, Values};

use super::{Params, ParamsContainer};

/// Common parameters of list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub ending_before: Option<String>,
    /// Range and equality filters, e.g. `created[gte]`.
    pub filters: Filters,
    pub limit: Option<i64>,
    /// Fetch a single page only. Not sent to the API.
    pub single: bool,
    pub starting_after: Option<String>,
    pub params: Params,
}

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `key[op]=value` filter.
    pub fn add_filter(
        &mut self,
        key: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.filters.add_filter(key, op, value);
    }
}

impl FormEncode for ListParams {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_field(values, keys, "ending_before", &self.ending_before);
        append_field(values, keys, "limit", &self.limit);
        append_field(values, keys, "starting_after", &self.starting_after);
        self.filters.append_to(values, keys);
        self.params.append_to(values, keys);
    }
}

impl ParamsContainer for ListParams {
    fn params(&self) -> &Params {
        &self.params
    }
}

/// Implemented by list parameter structs that embed [`ListParams`].
pub trait ListParamsContainer: ParamsContainer {
    fn list_params(&self) -> &ListParams;
}

impl ListParamsContainer for ListParams {
    fn list_params(&self) -> &ListParams {
        self
    }
}

#[cfg(test)]
mod tests {
    use paywire_common::form::encode_params;

    use super::*;

    #[test]
    fn encodes_cursor_limit_and_filters() {
        let mut list = ListParams {
            limit: Some(3),
            starting_after: Some("ch_123".to_string()),
            single: true,
            ..Default::default()
        };
        list.add_filter("created", "gte", "1700000000");
        list.params.add_expand("data.customer");

        assert_eq!(
            encode_params(&list).encode(),
            "limit=3&starting_after=ch_123&created[gte]=1700000000&expand[0]=data.customer"
        );
        assert!(list.list_params().single);
    }
}
