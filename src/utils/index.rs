use num_bigint::BigUint;

/// Formats a base-unit amount with the given number of decimals, e.g. `1500000` with 6
/// decimals becomes `1.500000`.
pub fn format_token_amount(amount: &BigUint, decimals: u32) -> String {
	if decimals == 0 {
		return amount.to_string();
	}

	let digits = amount.to_string();
	let decimals = decimals as usize;
	if digits.len() <= decimals {
		format!("0.{:0>width$}", digits, width = decimals)
	} else {
		let (whole, fraction) = digits.split_at(digits.len() - decimals);
		format!("{}.{}", whole, fraction)
	}
}

/// Address and hash comparison ignoring hex letter case.
pub fn is_case_insensitive_match(a: &str, b: &str) -> bool {
	a.eq_ignore_ascii_case(b)
}

/// Serializes `BigUint` amounts as base-10 strings instead of digit arrays.
pub mod biguint_string {
	use num_bigint::BigUint;
	use serde::{Deserialize, Deserializer, Serializer, de::Error};

	pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse::<BigUint>()
			.map_err(|e| D::Error::custom(format!("invalid amount {:?}: {}", raw, e)))
	}
}
