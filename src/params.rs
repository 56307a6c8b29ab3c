// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! Named request parameters.
//!
//! Parameters keep their insertion order. A list value expands into one
//! option per element, so `command = ["echo", "hi"]` is sent as
//! `-command echo -command hi`.
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Returns the option values, one per list element.
    pub fn to_strings(&self) -> Vec<String> {
        let mut ret = vec![];
        self.push_strings(&mut ret);
        ret
    }

    fn push_strings(&self, out: &mut Vec<String>) {
        match self {
            Self::List(x) => x.iter().for_each(|v| v.push_strings(out)),
            x => out.push(x.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(x) => f.write_str(x),
            Self::Int(x) => write!(f, "{}", x),
            Self::UInt(x) => write!(f, "{}", x),
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => {
                write!(f, "{:.1}", x)
            }
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::List(x) => {
                let mut first = true;
                for v in x {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_from {
    ($variant:ident($t:ty): $($from:ty),*) => {
        $(
            impl From<$from> for ParamValue {
                fn from(x: $from) -> Self { Self::$variant(<$t>::from(x)) }
            }
        )*
    };
}

impl_from!(Int(i64): i8, i16, i32, i64, u8, u16, u32);
impl_from!(UInt(u64): u64);
impl_from!(Float(f64): f32, f64);
impl_from!(Bool(bool): bool);
impl_from!(Str(String): String, &str, &String);

impl From<usize> for ParamValue {
    fn from(x: usize) -> Self { Self::UInt(x as u64) }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(x: Vec<T>) -> Self {
        Self::List(x.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<ParamValue>> From<&[T]> for ParamValue {
    fn from(x: &[T]) -> Self {
        Self::List(x.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>, const N: usize> From<[T; N]> for ParamValue {
    fn from(x: [T; N]) -> Self {
        Self::List(x.into_iter().map(Into::into).collect())
    }
}

/// Ordered `(name, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self { Self::default() }

    /// Builder form of [`Params::insert`].
    pub fn set<K: Into<String>, V: Into<ParamValue>>(
        mut self,
        name: K,
        value: V,
    ) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name` to `value`.
    ///
    /// An existing name keeps its position and gets the new value.
    pub fn insert<K: Into<String>, V: Into<ParamValue>>(
        &mut self,
        name: K,
        value: V,
    ) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.0.iter().position(|(k, _)| *k == name) {
            Some(i) => self.0[i].1 = value,
            None => self.0.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        let i = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(i).1)
    }

    #[inline]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens the parameters into `(name, value)` text pairs.
    ///
    /// List values repeat the name once per element.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut ret = Vec::with_capacity(self.0.len());
        for (k, v) in &self.0 {
            for s in v.to_strings() {
                ret.push((k.clone(), s));
            }
        }
        ret
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ret = Self::new();
        for (k, v) in iter {
            ret.insert(k, v);
        }
        ret
    }
}

/// Builds [`Params`] from `name => value` pairs.
///
/// ```
/// use pvectrl::params;
/// let p = params! { "vmid" => 100, "onboot" => true };
/// assert_eq!(2, p.len());
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::params::Params::new() };
    ($($k:expr => $v:expr),+ $(,)?) => {
        $crate::params::Params::new()$(.set($k, $v))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_text() {
        assert_eq!("True", ParamValue::from(true).to_string());
        assert_eq!("False", ParamValue::from(false).to_string());
        assert_eq!("512", ParamValue::from(512).to_string());
        assert_eq!("18446744073709551615", ParamValue::from(u64::MAX).to_string());
        assert_eq!("1.0", ParamValue::from(1.0).to_string());
        assert_eq!("0.5", ParamValue::from(0.5).to_string());
        assert_eq!(
            "local:vztmpl/debian.tar.gz",
            ParamValue::from("local:vztmpl/debian.tar.gz").to_string()
        );
        assert_eq!(
            vec!["echo".to_string(), "hello \"world\"".to_string()],
            ParamValue::from(vec!["echo", "hello \"world\""]).to_strings()
        );
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut p = params! { "cpus" => 1, "memory" => 512, "swap" => 512 };
        p.insert("cpus", 4);
        assert_eq!(
            vec![
                ("cpus".to_string(), "4".to_string()),
                ("memory".to_string(), "512".to_string()),
                ("swap".to_string(), "512".to_string()),
            ],
            p.pairs()
        );
        assert_eq!(Some(ParamValue::Int(512)), p.remove("swap"));
        assert_eq!(None, p.get("swap"));
        assert_eq!(2, p.len());
    }

    #[test]
    fn test_pairs_repeat_lists() {
        let p = params! {
            "command" => ["ls", "-l"],
            "vmid" => 100u32,
        };
        assert_eq!(
            vec![
                ("command".to_string(), "ls".to_string()),
                ("command".to_string(), "-l".to_string()),
                ("vmid".to_string(), "100".to_string()),
            ],
            p.pairs()
        );
        assert!(Params::new().pairs().is_empty());
    }

    #[test]
    fn test_from_iter() {
        let p: Params = vec![("a", "1"), ("b", "2"), ("a", "3")]
            .into_iter()
            .collect();
        assert_eq!(2, p.len());
        assert_eq!(Some(&ParamValue::from("3")), p.get("a"));
    }
}
