//! Conversions between value tags and native types.
//!
//! Every function here is a free function over [`Value`]. Integer
//! conversions widen freely and narrow only when the number fits; text is
//! parsed strictly as `[+-]?[0-9]+`; enum members convert to their integer
//! or text. Empty values never convert.

use crate::enum_set::EnumSet;
use crate::error::{ValueError, ValueResult};
use crate::value::{Datum, EnumValue, Scalar, Value, ValueType};
use std::cmp::Ordering;

/// Parses decimal text with an optional leading sign.
///
/// Anything other than an optional `+`/`-` followed by one or more ASCII
/// digits is rejected, including surrounding whitespace. Numbers beyond the
/// `i128` range report overflow or underflow against `target`.
fn parse_integer(text: &str, target: ValueType) -> ValueResult<i128> {
    let parse_error = || ValueError::Parse {
        text: text.to_string(),
        target,
    };

    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error());
    }

    let mut acc: i128 = 0;
    for b in digits.bytes() {
        let digit = i128::from(b - b'0');
        let next = acc.checked_mul(10).and_then(|n| {
            if negative {
                n.checked_sub(digit)
            } else {
                n.checked_add(digit)
            }
        });
        acc = match next {
            Some(n) => n,
            None if negative => return Err(ValueError::Underflow { target }),
            None => return Err(ValueError::Overflow { target }),
        };
    }
    Ok(acc)
}

fn scalar_integer(scalar: &Scalar, target: ValueType) -> ValueResult<i128> {
    match scalar {
        Scalar::Int(n) => Ok(i128::from(*n)),
        Scalar::UInt(n) => Ok(i128::from(*n)),
        Scalar::Text(s) => parse_integer(s, target),
    }
}

/// Widens any integer-like value to `i128`.
fn integer(value: &Value, target: ValueType) -> ValueResult<i128> {
    match value.datum() {
        Datum::Empty => Err(ValueError::Empty),
        Datum::Int32(n) => Ok(i128::from(*n)),
        Datum::UInt32(n) => Ok(i128::from(*n)),
        Datum::Int64(n) => Ok(i128::from(*n)),
        Datum::UInt64(n) => Ok(i128::from(*n)),
        Datum::Text(s) => parse_integer(s, target),
        Datum::Enum(member) => Ok(i128::from(member.value())),
        Datum::PrimaryKey(s) | Datum::Any(s) | Datum::Revision(s) => scalar_integer(s, target),
    }
}

fn narrow<T: TryFrom<i128>>(n: i128, target: ValueType) -> ValueResult<T> {
    T::try_from(n).map_err(|_| {
        if n < 0 {
            ValueError::Underflow { target }
        } else {
            ValueError::Overflow { target }
        }
    })
}

/// Converts a value to `i32`.
///
/// # Errors
///
/// Returns a conversion error if the value is empty, does not parse, or
/// does not fit.
pub fn to_int32(value: &Value) -> ValueResult<i32> {
    narrow(integer(value, ValueType::Int32)?, ValueType::Int32)
}

/// Converts a value to `u32`.
///
/// # Errors
///
/// Same as [`to_int32`].
pub fn to_uint32(value: &Value) -> ValueResult<u32> {
    narrow(integer(value, ValueType::UInt32)?, ValueType::UInt32)
}

/// Converts a value to `i64`.
///
/// Text converts only if it is exactly an optional sign followed by decimal
/// digits and fits in 64 bits.
///
/// # Errors
///
/// Same as [`to_int32`].
pub fn to_int64(value: &Value) -> ValueResult<i64> {
    narrow(integer(value, ValueType::Int64)?, ValueType::Int64)
}

/// Converts a value to `u64`.
///
/// # Errors
///
/// Same as [`to_int32`].
pub fn to_uint64(value: &Value) -> ValueResult<u64> {
    narrow(integer(value, ValueType::UInt64)?, ValueType::UInt64)
}

/// Converts a value to text. Numbers are rendered in decimal and enum
/// members yield their text.
///
/// # Errors
///
/// Returns [`ValueError::Empty`] for an empty value.
pub fn to_text(value: &Value) -> ValueResult<String> {
    match value.datum() {
        Datum::Empty => Err(ValueError::Empty),
        Datum::Text(s) => Ok(s.clone()),
        Datum::Enum(member) => Ok(member.text().to_string()),
        _ => Ok(value.to_string()),
    }
}

/// Converts a value to the backend-neutral scalar carried by primary-key,
/// any and revision values.
///
/// # Errors
///
/// Returns [`ValueError::Empty`] for an empty value.
pub fn to_scalar(value: &Value) -> ValueResult<Scalar> {
    match value.datum() {
        Datum::Empty => Err(ValueError::Empty),
        Datum::Int32(n) => Ok(Scalar::Int(i64::from(*n))),
        Datum::Int64(n) => Ok(Scalar::Int(*n)),
        Datum::UInt32(n) => Ok(Scalar::UInt(u64::from(*n))),
        Datum::UInt64(n) => Ok(Scalar::UInt(*n)),
        Datum::Text(s) => Ok(Scalar::Text(s.clone())),
        Datum::Enum(member) => Ok(Scalar::Int(i64::from(member.value()))),
        Datum::PrimaryKey(s) | Datum::Any(s) | Datum::Revision(s) => Ok(s.clone()),
    }
}

/// Resolves a value against an enum set.
///
/// Enum values must be members of `set`; text is looked up by member text
/// and integers by member value.
///
/// # Errors
///
/// Returns [`ValueError::EnumNotInSet`] if no member matches, or a type
/// mismatch for values that cannot name a member.
pub fn to_enum(value: &Value, set: &EnumSet) -> ValueResult<EnumValue> {
    let found = match value.datum() {
        Datum::Empty => return Err(ValueError::Empty),
        Datum::Enum(member) => {
            return if set.contains(member) {
                Ok(member.clone())
            } else {
                Err(ValueError::not_in_set(member.text()))
            };
        }
        Datum::Text(s) | Datum::Any(Scalar::Text(s)) => set.by_text(s),
        Datum::PrimaryKey(_) | Datum::Revision(_) => {
            return Err(ValueError::mismatch(ValueType::Enum, value.value_type()));
        }
        _ => {
            let n = to_int32(value)?;
            set.by_value(n)
        }
    };
    found
        .cloned()
        .ok_or_else(|| ValueError::not_in_set(value.to_string()))
}

fn compare_scalars(a: &Scalar, b: &Scalar, tag: ValueType) -> ValueResult<Ordering> {
    match (a, b) {
        (Scalar::Text(x), Scalar::Text(y)) => Ok(x.as_bytes().cmp(y.as_bytes())),
        (Scalar::Text(_), _) | (_, Scalar::Text(_)) => Err(ValueError::mismatch(tag, tag)),
        _ => Ok(scalar_integer(a, tag)?.cmp(&scalar_integer(b, tag)?)),
    }
}

/// Compares two values.
///
/// - Integer tags compare numerically, also across widths and signedness
/// - Text compares byte-lexically
/// - Enum members compare by their integer
/// - Primary-key, any and revision values compare by scalar, against the
///   same tag only
///
/// # Errors
///
/// Returns [`ValueError::Empty`] if either value is empty and a type
/// mismatch if the tags are not comparable.
pub fn compare(a: &Value, b: &Value) -> ValueResult<Ordering> {
    if a.is_empty() || b.is_empty() {
        return Err(ValueError::Empty);
    }

    let (ta, tb) = (a.value_type(), b.value_type());
    if ta.is_integer() && tb.is_integer() {
        return Ok(integer(a, ta)?.cmp(&integer(b, tb)?));
    }

    match (a.datum(), b.datum()) {
        (Datum::Text(x), Datum::Text(y)) => Ok(x.as_bytes().cmp(y.as_bytes())),
        (Datum::Enum(x), Datum::Enum(y)) => Ok(x.value().cmp(&y.value())),
        (Datum::PrimaryKey(x), Datum::PrimaryKey(y))
        | (Datum::Any(x), Datum::Any(y))
        | (Datum::Revision(x), Datum::Revision(y)) => compare_scalars(x, y, ta),
        _ => Err(ValueError::mismatch(ta, tb)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn widening_always_succeeds() {
        assert_eq!(to_int64(&Value::int32(-7)).unwrap(), -7);
        assert_eq!(to_uint64(&Value::uint32(u32::MAX)).unwrap(), u64::from(u32::MAX));
        assert_eq!(to_int64(&Value::uint32(u32::MAX)).unwrap(), i64::from(u32::MAX));
    }

    #[test]
    fn narrowing_checks_range() {
        assert_eq!(to_int32(&Value::int64(123)).unwrap(), 123);
        assert_eq!(
            to_int32(&Value::int64(i64::from(i32::MAX) + 1)),
            Err(ValueError::Overflow {
                target: ValueType::Int32
            })
        );
        assert_eq!(
            to_uint32(&Value::int32(-1)),
            Err(ValueError::Underflow {
                target: ValueType::UInt32
            })
        );
        assert_eq!(
            to_int64(&Value::uint64(u64::MAX)),
            Err(ValueError::Overflow {
                target: ValueType::Int64
            })
        );
    }

    #[test]
    fn text_parses_strictly() {
        assert_eq!(to_int64(&Value::text("42")).unwrap(), 42);
        assert_eq!(to_int64(&Value::text("-42")).unwrap(), -42);
        assert_eq!(to_int64(&Value::text("+42")).unwrap(), 42);
        assert_eq!(to_int64(&Value::text("007")).unwrap(), 7);

        for bad in ["", "-", "+", " 1", "1 ", "1.0", "0x10", "12a", "--1"] {
            assert!(
                matches!(to_int64(&Value::text(bad)), Err(ValueError::Parse { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn text_parse_range() {
        assert_eq!(
            to_int64(&Value::text("9223372036854775807")).unwrap(),
            i64::MAX
        );
        assert_eq!(
            to_int64(&Value::text("-9223372036854775808")).unwrap(),
            i64::MIN
        );
        assert!(matches!(
            to_int64(&Value::text("9223372036854775808")),
            Err(ValueError::Overflow { .. })
        ));
        assert!(matches!(
            to_int64(&Value::text("-9223372036854775809")),
            Err(ValueError::Underflow { .. })
        ));
        assert!(matches!(
            to_int64(&Value::text("999999999999999999999999999999999999999999")),
            Err(ValueError::Overflow { .. })
        ));
    }

    #[test]
    fn empty_never_converts() {
        let empty = Value::new();
        assert_eq!(to_int32(&empty), Err(ValueError::Empty));
        assert_eq!(to_text(&empty), Err(ValueError::Empty));
        assert_eq!(to_scalar(&empty), Err(ValueError::Empty));
    }

    #[test]
    fn enum_conversions() {
        let set = EnumSet::new([("low", 1), ("high", 10)]).unwrap();
        let high = Value::enumeration(EnumValue::new(10, "high"));

        assert_eq!(to_int32(&high).unwrap(), 10);
        assert_eq!(to_text(&high).unwrap(), "high");
        assert_eq!(to_enum(&Value::text("low"), &set).unwrap().value(), 1);
        assert_eq!(to_enum(&Value::int64(10), &set).unwrap().text(), "high");
        assert!(matches!(
            to_enum(&Value::int64(5), &set),
            Err(ValueError::EnumNotInSet { .. })
        ));
        assert!(matches!(
            to_enum(&Value::enumeration(EnumValue::new(10, "other")), &set),
            Err(ValueError::EnumNotInSet { .. })
        ));
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(to_scalar(&Value::uint32(3)).unwrap(), Scalar::UInt(3));
        assert_eq!(to_scalar(&Value::int32(-3)).unwrap(), Scalar::Int(-3));
        assert_eq!(to_uint64(&Value::primary_key(8u64)).unwrap(), 8);
        assert_eq!(to_int32(&Value::any("12")).unwrap(), 12);
        assert_eq!(to_text(&Value::revision(4i64)).unwrap(), "4");
    }

    #[test]
    fn compare_numbers_across_widths() {
        assert_eq!(
            compare(&Value::int32(-1), &Value::uint64(0)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::uint64(u64::MAX), &Value::int64(i64::MAX)).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            compare(&Value::uint32(5), &Value::int64(5)).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn compare_text_bytewise() {
        assert_eq!(
            compare(&Value::text("B"), &Value::text("a")).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::text("ab"), &Value::text("abc")).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn compare_enum_by_integer() {
        let a = Value::enumeration(EnumValue::new(2, "zzz"));
        let b = Value::enumeration(EnumValue::new(3, "aaa"));
        assert_eq!(compare(&a, &b).unwrap(), Ordering::Less);
    }

    #[test]
    fn compare_rejects_empty_and_mismatch() {
        assert_eq!(compare(&Value::new(), &Value::new()), Err(ValueError::Empty));
        assert_eq!(compare(&Value::int32(1), &Value::new()), Err(ValueError::Empty));
        assert!(matches!(
            compare(&Value::int32(1), &Value::text("1")),
            Err(ValueError::TypeMismatch { .. })
        ));
        assert!(compare(&Value::primary_key(1u64), &Value::uint64(1)).is_err());
        assert!(compare(&Value::primary_key(1u64), &Value::primary_key("1")).is_err());
    }

    #[test]
    fn compare_scalar_carriers() {
        assert_eq!(
            compare(&Value::primary_key(1u64), &Value::primary_key(2i64)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::revision("b"), &Value::revision("a")).unwrap(),
            Ordering::Greater
        );
    }

    proptest! {
        #[test]
        fn int64_text_roundtrip(n in any::<i64>()) {
            prop_assert_eq!(to_int64(&Value::text(n.to_string())).unwrap(), n);
        }

        #[test]
        fn text_to_int64_matches_grammar(s in "[+-]?[0-9]{0,25}|[ a-z0-9.+-]{0,8}") {
            let expected = s.parse::<i64>().ok().filter(|_| {
                let digits = s.trim_start_matches(['+', '-']);
                !digits.is_empty()
                    && digits.bytes().all(|b| b.is_ascii_digit())
                    && s.len() - digits.len() <= 1
            });
            let got = to_int64(&Value::text(s.clone())).ok();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn compare_is_reflexive(n in any::<i64>(), s in ".*") {
            prop_assert_eq!(compare(&Value::int64(n), &Value::int64(n)).unwrap(), Ordering::Equal);
            prop_assert_eq!(compare(&Value::text(s.clone()), &Value::text(s)).unwrap(), Ordering::Equal);
        }

        #[test]
        fn compare_matches_native_order(a in any::<i64>(), b in any::<u32>()) {
            let got = compare(&Value::int64(a), &Value::uint32(b)).unwrap();
            prop_assert_eq!(got, i128::from(a).cmp(&i128::from(b)));
            prop_assert_eq!(
                compare(&Value::uint32(b), &Value::int64(a)).unwrap(),
                got.reverse()
            );
        }

        #[test]
        fn compare_text_is_antisymmetric(a in ".*", b in ".*") {
            let ab = compare(&Value::text(a.clone()), &Value::text(b.clone())).unwrap();
            let ba = compare(&Value::text(b), &Value::text(a)).unwrap();
            prop_assert_eq!(ab, ba.reverse());
        }
    }
}
