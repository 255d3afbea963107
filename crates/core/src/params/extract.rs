use std::collections::BTreeMap;

use paywire_common::form::{encode_params, FormEncode, Values};
use paywire_domain::{PaywireError, Result};

use super::Params;

/// Implemented by every parameter struct.
///
/// Structs encode their own fields first and call `Params::append_to` on the
/// embedded value last, so extras land after the structured fields.
pub trait ParamsContainer: FormEncode + Send + Sync {
    /// The embedded common parameters.
    fn params(&self) -> &Params;

    /// `expand` declared on the struct itself, if it has one and it is set.
    fn expand(&self) -> Option<&[String]> {
        None
    }

    /// `metadata` declared on the struct itself, if it has one and it is set.
    fn metadata(&self) -> Option<&BTreeMap<String, String>> {
        None
    }

    /// Unqualified type name without generic arguments, used in error messages.
    fn type_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Encodes a parameter struct and pulls out its common parameters.
///
/// Fails when a field is set both on the struct and through its deprecated
/// `Params` counterpart. Nothing is sent in that case.
pub fn extract_params(
    container: Option<&dyn ParamsContainer>,
) -> Result<(Option<Values>, Option<&Params>)> {
    let Some(container) = container else {
        return Ok((None, None));
    };
    let common = container.params();

    if container.metadata().is_some() && common.metadata.is_some() {
        return Err(PaywireError::Validation(format!(
            "You cannot specify both the (deprecated) .Params.Metadata and .Metadata in {}",
            container.type_name()
        )));
    }
    if container.expand().is_some() && common.expand.is_some() {
        return Err(PaywireError::Validation(format!(
            "You cannot specify both the (deprecated) .Params.Expand and .Expand in {}",
            container.type_name()
        )));
    }

    Ok((Some(encode_params(container)), Some(common)))
}

#[cfg(test)]
mod tests {
    use paywire_common::form::append_field;

    use super::*;

    #[derive(Default)]
    struct ChargeParams {
        amount: Option<i64>,
        expand: Option<Vec<String>>,
        metadata: Option<BTreeMap<String, String>>,
        params: Params,
    }

    impl FormEncode for ChargeParams {
        fn append_to(&self, values: &mut Values, keys: &[String]) {
            append_field(values, keys, "amount", &self.amount);
            append_field(values, keys, "expand", &self.expand);
            append_field(values, keys, "metadata", &self.metadata);
            self.params.append_to(values, keys);
        }
    }

    impl ParamsContainer for ChargeParams {
        fn params(&self) -> &Params {
            &self.params
        }

        fn expand(&self) -> Option<&[String]> {
            self.expand.as_deref()
        }

        fn metadata(&self) -> Option<&BTreeMap<String, String>> {
            self.metadata.as_ref()
        }
    }

    #[test]
    fn absent_container_yields_nothing() {
        let (values, params) = extract_params(None).unwrap();
        assert!(values.is_none());
        assert!(params.is_none());
    }

    #[test]
    fn encodes_container_and_returns_common_params() {
        let mut charge = ChargeParams {
            amount: Some(2000),
            expand: Some(vec!["customer".to_string()]),
            ..Default::default()
        };
        charge.params.set_stripe_account("acct_1");
        charge.params.add_extra("beta", "1");

        let (values, params) = extract_params(Some(&charge)).unwrap();
        assert_eq!(values.unwrap().encode(), "amount=2000&expand[0]=customer&beta=1");
        assert_eq!(params.unwrap().stripe_account.as_deref(), Some("acct_1"));
    }

    #[test]
    fn rejects_double_expand() {
        let mut charge =
            ChargeParams { expand: Some(vec!["customer".to_string()]), ..Default::default() };
        charge.params.add_expand("invoice");

        let err = extract_params(Some(&charge)).unwrap_err();
        assert!(matches!(err, PaywireError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "You cannot specify both the (deprecated) .Params.Expand and .Expand in ChargeParams"
        );
    }

    #[test]
    fn rejects_double_metadata() {
        let mut charge = ChargeParams { metadata: Some(BTreeMap::new()), ..Default::default() };
        charge.params.add_metadata("a", "b");

        let err = extract_params(Some(&charge)).unwrap_err();
        assert!(err.to_string().contains(".Params.Metadata and .Metadata in ChargeParams"));
    }

    struct Paged<T> {
        inner: T,
        params: Params,
    }

    impl<T: FormEncode + Send + Sync> FormEncode for Paged<T> {
        fn append_to(&self, values: &mut Values, keys: &[String]) {
            self.inner.append_to(values, keys);
            self.params.append_to(values, keys);
        }
    }

    impl<T: FormEncode + Send + Sync> ParamsContainer for Paged<T> {
        fn params(&self) -> &Params {
            &self.params
        }
    }

    #[test]
    fn generic_containers_are_named_without_arguments() {
        let paged = Paged { inner: ChargeParams::default(), params: Params::new() };
        assert_eq!(paged.type_name(), "Paged");
        assert_eq!(ChargeParams::default().type_name(), "ChargeParams");
    }

    #[test]
    fn deprecated_field_alone_is_fine() {
        let mut charge = ChargeParams::default();
        charge.params.add_expand("invoice");

        let (values, _) = extract_params(Some(&charge)).unwrap();
        assert_eq!(values.unwrap().encode(), "expand[0]=invoice");
    }
}
