//! HTTP methods as a bitmask.
//!
//! A [`MethodMask`] describes a set of methods in a single integer, e.g. the methods a
//! route accepts. Each standard method owns one bit.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use http::Method;

use crate::MessageError;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct MethodMask(u16);

macro_rules! method_bits {
    ($($name:ident = $bit:expr),+ $(,)?) => {
        impl MethodMask {
            $(
                #[doc = concat!("The HTTP ", stringify!($name), " method.")]
                pub const $name: MethodMask = MethodMask($bit);
            )+

            const TABLE: &'static [(MethodMask, Method)] = &[$((MethodMask::$name, Method::$name)),+];
        }
    };
}

method_bits!(
    CONNECT = 1,
    DELETE = 2,
    GET = 4,
    HEAD = 8,
    OPTIONS = 16,
    PATCH = 32,
    POST = 64,
    PUT = 128,
    TRACE = 256,
);

impl MethodMask {
    pub const EMPTY: MethodMask = MethodMask(0);

    pub const ALL: MethodMask = MethodMask(0b1_1111_1111);

    /// The safe methods which never carry a body to parse.
    pub const GET_HEAD_OPTIONS: MethodMask = MethodMask(Self::GET.0 | Self::HEAD.0 | Self::OPTIONS.0);

    /// Builds a mask from raw bits, dropping bits that name no method.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// The bit of a standard method, `None` for extension methods.
    pub fn of(method: &Method) -> Option<MethodMask> {
        Self::TABLE.iter().find(|(_, candidate)| candidate == method).map(|(mask, _)| *mask)
    }

    /// Returns true if `name` is a standard method, ignoring case.
    pub fn is_valid_method(name: &str) -> bool {
        name.parse::<MethodMask>().is_ok()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, method: &Method) -> bool {
        Self::of(method).is_some_and(|mask| self.0 & mask.0 != 0)
    }

    /// The methods in this mask, in bit order.
    pub fn methods(self) -> Vec<Method> {
        Self::TABLE.iter().filter(|(mask, _)| self.0 & mask.0 != 0).map(|(_, method)| method.clone()).collect()
    }
}

impl FromStr for MethodMask {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TABLE
            .iter()
            .find(|(_, method)| method.as_str().eq_ignore_ascii_case(s))
            .map(|(mask, _)| *mask)
            .ok_or_else(|| MessageError::invalid_argument(format!("invalid http method: {s}")))
    }
}

impl BitOr for MethodMask {
    type Output = MethodMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        MethodMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for MethodMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for MethodMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::TABLE
            .iter()
            .filter(|(mask, _)| self.0 & mask.0 != 0)
            .map(|(_, method)| method.as_str())
            .collect();
        f.write_str(&names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of() {
        assert_eq!(MethodMask::of(&Method::GET), Some(MethodMask::GET));
        assert_eq!(MethodMask::of(&Method::TRACE).map(MethodMask::bits), Some(256));
        assert_eq!(MethodMask::of(&Method::from_bytes(b"PURGE").unwrap()), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("post".parse::<MethodMask>().unwrap(), MethodMask::POST);
        assert_eq!("Options".parse::<MethodMask>().unwrap(), MethodMask::OPTIONS);
        assert!(matches!("FETCH".parse::<MethodMask>(), Err(MessageError::InvalidArgument { .. })));

        assert!(MethodMask::is_valid_method("delete"));
        assert!(!MethodMask::is_valid_method(""));
    }

    #[test]
    fn test_combination() {
        let mut mask = MethodMask::GET | MethodMask::POST;
        assert!(mask.contains(&Method::GET));
        assert!(!mask.contains(&Method::PUT));

        mask |= MethodMask::PUT;
        assert_eq!(mask.methods(), vec![Method::GET, Method::POST, Method::PUT]);
        assert_eq!(mask.to_string(), "GET|POST|PUT");
    }

    #[test]
    fn test_presets() {
        assert_eq!(MethodMask::ALL.methods().len(), 9);
        assert_eq!(MethodMask::GET_HEAD_OPTIONS.bits(), 4 | 8 | 16);
        assert_eq!(MethodMask::from_bits(0xFFFF), MethodMask::ALL);
        assert!(MethodMask::EMPTY.is_empty());
        assert!(MethodMask::EMPTY.methods().is_empty());
    }
}
