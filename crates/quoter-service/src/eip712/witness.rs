//! Parametric witness type-string parsing and hashing.
//!
//! Arbiter registry entries carry their witness type string; nothing here is
//! specific to the Mandate shape. The grammar is:
//!
//! ```text
//! TypeString  = Declaration ")" Definition
//! Declaration = StructName " " VariableName
//! Definition  = StructName "(" ParamList ")"
//! ParamList   = Param ("," Param)*
//! Param       = SolidityType " " FieldName
//! ```
//!
//! The struct hash follows EIP-712: `keccak256(typeHash || word(field)...)`
//! with each field ABI-encoded into one 32-byte word against its declared
//! type, and dynamic types replaced by the keccak of their contents.

use alloy_primitives::{keccak256, Address, B256, U256};
use quoter_types::{Mandate, WitnessError};
use std::collections::BTreeMap;

/// One declared parameter of a witness struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessParam {
	pub sol_type: String,
	pub name: String,
}

/// A parsed witness type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessType {
	struct_name: String,
	/// Key under which the mandate is stored inside the compact's typed
	/// data. Read from the declaration, never assumed.
	pub variable_name: String,
	params: Vec<WitnessParam>,
}

/// A value to encode against a declared solidity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitnessValue {
	Uint(U256),
	Address(Address),
	FixedBytes(B256),
	Bool(bool),
	Bytes(Vec<u8>),
	String(String),
}

impl WitnessType {
	/// Parse a witness type string, rejecting anything that fails the
	/// grammar exactly.
	pub fn parse(type_string: &str) -> Result<Self, WitnessError> {
		let pieces: Vec<&str> = type_string.split(')').filter(|p| !p.is_empty()).collect();
		if pieces.len() != 2 {
			return Err(WitnessError::Parse(format!(
				"expected declaration and definition, found {} pieces",
				pieces.len()
			)));
		}

		let (struct_name, variable_name) = parse_declaration(pieces[0])?;

		let (def_name, param_list) = pieces[1].split_once('(').ok_or_else(|| {
			WitnessError::Parse("definition missing opening parenthesis".to_string())
		})?;
		if def_name != struct_name {
			return Err(WitnessError::Parse(format!(
				"declaration names '{}' but definition names '{}'",
				struct_name, def_name
			)));
		}
		if param_list.contains('(') {
			return Err(WitnessError::Parse(
				"nested parentheses in definition".to_string(),
			));
		}

		let params = param_list
			.split(',')
			.map(parse_param)
			.collect::<Result<Vec<_>, _>>()?;
		if params.is_empty() {
			return Err(WitnessError::Parse("empty parameter list".to_string()));
		}

		Ok(Self {
			struct_name: struct_name.to_string(),
			variable_name: variable_name.to_string(),
			params,
		})
	}

	/// The canonical EIP-712 encoding of this type,
	/// `StructName(type1,type2,...)`.
	pub fn canonical(&self) -> String {
		let types: Vec<&str> = self.params.iter().map(|p| p.sol_type.as_str()).collect();
		format!("{}({})", self.struct_name, types.join(","))
	}

	/// `keccak256` of the canonical type encoding.
	pub fn type_hash(&self) -> B256 {
		keccak256(self.canonical().as_bytes())
	}

	pub fn params(&self) -> &[WitnessParam] {
		&self.params
	}

	/// EIP-712 struct hash over the supplied field values. Every declared
	/// field must be present in `values`.
	pub fn struct_hash(
		&self,
		values: &BTreeMap<String, WitnessValue>,
	) -> Result<B256, WitnessError> {
		let mut data = Vec::with_capacity(32 * (1 + self.params.len()));
		data.extend_from_slice(self.type_hash().as_slice());

		for param in &self.params {
			let value = values
				.get(&param.name)
				.ok_or_else(|| WitnessError::MissingField(param.name.clone()))?;
			let word = encode_word(&param.sol_type, value, &param.name)?;
			data.extend_from_slice(&word);
		}

		Ok(keccak256(data))
	}
}

fn parse_declaration(declaration: &str) -> Result<(&str, &str), WitnessError> {
	let mut parts = declaration.split(' ').filter(|p| !p.is_empty());
	let struct_name = parts
		.next()
		.ok_or_else(|| WitnessError::Parse("empty declaration".to_string()))?;
	let variable_name = parts
		.next()
		.ok_or_else(|| WitnessError::Parse("declaration missing variable name".to_string()))?;
	if parts.next().is_some() {
		return Err(WitnessError::Parse(format!(
			"declaration '{}' has trailing tokens",
			declaration
		)));
	}
	Ok((struct_name, variable_name))
}

fn parse_param(param: &str) -> Result<WitnessParam, WitnessError> {
	let (sol_type, name) = param
		.split_once(' ')
		.ok_or_else(|| WitnessError::Parse(format!("malformed parameter '{}'", param)))?;
	if sol_type.is_empty() || name.is_empty() || name.contains(' ') {
		return Err(WitnessError::Parse(format!(
			"malformed parameter '{}'",
			param
		)));
	}
	if !is_valid_solidity_type(sol_type) {
		return Err(WitnessError::Parse(format!(
			"unknown solidity type '{}'",
			sol_type
		)));
	}
	Ok(WitnessParam {
		sol_type: sol_type.to_string(),
		name: name.to_string(),
	})
}

/// Accept the value types of the solidity ABI that fit a single word, plus
/// the dynamic `bytes`/`string` which hash per EIP-712.
fn is_valid_solidity_type(sol_type: &str) -> bool {
	match sol_type {
		"address" | "bool" | "bytes" | "string" | "uint" | "int" => true,
		_ => {
			if let Some(bits) = sol_type
				.strip_prefix("uint")
				.or_else(|| sol_type.strip_prefix("int"))
			{
				return matches!(bits.parse::<u16>(), Ok(n) if n >= 8 && n <= 256 && n % 8 == 0);
			}
			if let Some(size) = sol_type.strip_prefix("bytes") {
				return matches!(size.parse::<u8>(), Ok(n) if n >= 1 && n <= 32);
			}
			false
		},
	}
}

fn encode_word(
	sol_type: &str,
	value: &WitnessValue,
	field: &str,
) -> Result<[u8; 32], WitnessError> {
	let mismatch = || {
		WitnessError::Parse(format!(
			"value for field '{}' does not match type '{}'",
			field, sol_type
		))
	};

	let word = match value {
		WitnessValue::Uint(v)
			if sol_type.starts_with("uint") || sol_type.starts_with("int") =>
		{
			v.to_be_bytes::<32>()
		},
		WitnessValue::Address(a) if sol_type == "address" => {
			let mut word = [0u8; 32];
			word[12..32].copy_from_slice(a.as_slice());
			word
		},
		WitnessValue::FixedBytes(b)
			if sol_type.starts_with("bytes") && sol_type != "bytes" =>
		{
			b.0
		},
		WitnessValue::Bool(b) if sol_type == "bool" => {
			let mut word = [0u8; 32];
			word[31] = *b as u8;
			word
		},
		WitnessValue::Bytes(b) if sol_type == "bytes" => keccak256(b).0,
		WitnessValue::String(s) if sol_type == "string" => keccak256(s.as_bytes()).0,
		_ => return Err(mismatch()),
	};
	Ok(word)
}

/// The nine mandate fields under their canonical witness names.
pub fn mandate_witness_values(mandate: &Mandate) -> BTreeMap<String, WitnessValue> {
	BTreeMap::from([
		("chainId".to_string(), WitnessValue::Uint(mandate.chain_id)),
		(
			"tribunal".to_string(),
			WitnessValue::Address(mandate.tribunal),
		),
		(
			"recipient".to_string(),
			WitnessValue::Address(mandate.recipient),
		),
		("expires".to_string(), WitnessValue::Uint(mandate.expires)),
		("token".to_string(), WitnessValue::Address(mandate.token)),
		(
			"minimumAmount".to_string(),
			WitnessValue::Uint(mandate.minimum_amount),
		),
		(
			"baselinePriorityFee".to_string(),
			WitnessValue::Uint(mandate.baseline_priority_fee),
		),
		(
			"scalingFactor".to_string(),
			WitnessValue::Uint(mandate.scaling_factor),
		),
		(
			"salt".to_string(),
			WitnessValue::FixedBytes(mandate.salt),
		),
	])
}
