//! Bracketed form encoding
//!
//! Flattens nested parameter values into ordered `key=value` pairs using the
//! bracket convention of the remote API:
//!
//! - nested fields become `parent[child][grandchild]`
//! - sequences are indexed: `expand[0]`, `expand[1]`
//! - `None` is omitted entirely, which is how "not set" differs from a zero
//!   value
//! - map keys are emitted in sorted order
//! - [`ExtraValues`] are appended after the structured fields
//!
//! Parameter types implement [`FormEncode`] by listing their fields with
//! [`append_field`]. Encoding is pure: the same value always produces the
//! same bytes.
//!
//! ```rust
//! use paywire_common::form::{append_field, encode_params, FormEncode, Values};
//!
//! struct ChargeParams {
//!     amount: Option<i64>,
//!     currency: Option<String>,
//!     expand: Option<Vec<String>>,
//! }
//!
//! impl FormEncode for ChargeParams {
//!     fn append_to(&self, values: &mut Values, keys: &[String]) {
//!         append_field(values, keys, "amount", &self.amount);
//!         append_field(values, keys, "currency", &self.currency);
//!         append_field(values, keys, "expand", &self.expand);
//!     }
//! }
//!
//! let params = ChargeParams {
//!     amount: Some(2000),
//!     currency: None,
//!     expand: Some(vec!["customer".into()]),
//! };
//! assert_eq!(encode_params(&params).encode(), "amount=2000&expand[0]=customer");
//! ```

mod encode;
mod extras;
mod path;
mod values;

pub use encode::{append_field, encode_params, format_key, FormEncode, HighPrecision};
pub use extras::{ExtraValues, Filters, RangeQueryParams};
pub use path::format_url_path;
pub use values::Values;
