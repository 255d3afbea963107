use std::collections::{BTreeMap, HashMap};

use super::values::Values;

/// A value that knows how to flatten itself into form pairs.
///
/// `keys` is the path of the value inside the parameter tree; implementations
/// for leaves emit one pair under `format_key(keys)`, containers extend the
/// path and recurse. Parameter structs implement this by hand (or through a
/// code generator), calling [`append_field`] once per field in declaration
/// order.
pub trait FormEncode {
    /// Appends this value's pairs under `keys`.
    fn append_to(&self, values: &mut Values, keys: &[String]);
}

/// Joins key parts as `a[b][c]`.
#[must_use]
pub fn format_key<S: AsRef<str>>(parts: &[S]) -> String {
    let mut iter = parts.iter();
    let mut key = iter.next().map(|p| p.as_ref().to_string()).unwrap_or_default();
    for part in iter {
        key.push('[');
        key.push_str(part.as_ref());
        key.push(']');
    }
    key
}

/// Encodes a whole parameter tree.
#[must_use]
pub fn encode_params<T: FormEncode + ?Sized>(params: &T) -> Values {
    let mut values = Values::new();
    params.append_to(&mut values, &[]);
    values
}

/// Appends `value` under `keys` extended with `name`.
pub fn append_field<T: FormEncode + ?Sized>(
    values: &mut Values,
    keys: &[String],
    name: &str,
    value: &T,
) {
    let mut child = Vec::with_capacity(keys.len() + 1);
    child.extend_from_slice(keys);
    child.push(name.to_string());
    value.append_to(values, &child);
}

fn append_leaf(values: &mut Values, keys: &[String], value: String) {
    if !keys.is_empty() {
        values.add(format_key(keys), value);
    }
}

macro_rules! impl_display_encode {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FormEncode for $ty {
                fn append_to(&self, values: &mut Values, keys: &[String]) {
                    append_leaf(values, keys, self.to_string());
                }
            }
        )+
    };
}

impl_display_encode!(
    str, String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

/// Floats are sent with four decimal places.
impl FormEncode for f64 {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_leaf(values, keys, format!("{self:.4}"));
    }
}

impl FormEncode for f32 {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        f64::from(*self).append_to(values, keys);
    }
}

/// A decimal sent with as many digits as it takes to round-trip.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HighPrecision(pub f64);

impl FormEncode for HighPrecision {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_leaf(values, keys, self.0.to_string());
    }
}

/// `None` is "not set" and emits nothing.
impl<T: FormEncode> FormEncode for Option<T> {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        if let Some(inner) = self {
            inner.append_to(values, keys);
        }
    }
}

impl<T: FormEncode + ?Sized> FormEncode for &T {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        (**self).append_to(values, keys);
    }
}

impl<T: FormEncode + ?Sized> FormEncode for Box<T> {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        (**self).append_to(values, keys);
    }
}

/// Items are indexed `key[0]`, `key[1]`, ...
///
/// An empty sequence emits `key=` so that a field explicitly set to an empty
/// list clears it on the server. Leave the field `None` to not send it.
impl<T: FormEncode> FormEncode for [T] {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        if self.is_empty() {
            append_leaf(values, keys, String::new());
            return;
        }
        for (index, item) in self.iter().enumerate() {
            append_field(values, keys, &index.to_string(), item);
        }
    }
}

impl<T: FormEncode> FormEncode for Vec<T> {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        self.as_slice().append_to(values, keys);
    }
}

impl<T: FormEncode> FormEncode for BTreeMap<String, T> {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        for (name, value) in self {
            append_field(values, keys, name, value);
        }
    }
}

/// Keys are sorted so the output does not depend on hash order.
impl<T: FormEncode, S: std::hash::BuildHasher> FormEncode for HashMap<String, T, S> {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        let mut names: Vec<&String> = self.keys().collect();
        names.sort();
        for name in names {
            if let Some(value) = self.get(name) {
                append_field(values, keys, name, value);
            }
        }
    }
}
