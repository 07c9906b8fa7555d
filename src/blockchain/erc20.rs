use ethers::abi::{AbiDecode, AbiEncode};
use ethers::contract::abigen;
use ethers::types::{Address, Bytes, H256, U256};
use std::str::FromStr;

abigen!(
    IERC20,
    r#"[
        function name() external view returns (string)
        function symbol() external view returns (string)
        function decimals() external view returns (uint8)
        function balanceOf(address account) external view returns (uint256)
        function transfer(address to, uint256 amount) external returns (bool)
        event Transfer(address indexed from, address indexed to, uint256 value)
    ]"#,
);

/// ERC-20 Transfer event signature: Transfer(address indexed from, address indexed to, uint256 value)
pub const TRANSFER_EVENT_SIGNATURE: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Left-pad an address into a 32-byte indexed topic
pub fn address_to_topic(address: Address) -> H256 {
    H256::from(address)
}

/// Hex form of an indexed address topic, as used in `eth_getLogs` filters
pub fn address_topic_hex(address: Address) -> String {
    format!("{:?}", address_to_topic(address))
}

pub fn name_calldata() -> Bytes {
    NameCall.encode().into()
}

pub fn symbol_calldata() -> Bytes {
    SymbolCall.encode().into()
}

pub fn decimals_calldata() -> Bytes {
    DecimalsCall.encode().into()
}

pub fn balance_of_calldata(account: Address) -> Bytes {
    BalanceOfCall { account }.encode().into()
}

pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    TransferCall { to, amount }.encode().into()
}

pub fn decode_string(output: &Bytes) -> Result<String, ethers::abi::AbiError> {
    String::decode(output.as_ref())
}

pub fn decode_u8(output: &Bytes) -> Result<u8, ethers::abi::AbiError> {
    u8::decode(output.as_ref())
}

pub fn decode_uint(output: &Bytes) -> Result<U256, ethers::abi::AbiError> {
    U256::decode(output.as_ref())
}

/// Recover an address from a 32-byte indexed topic
pub fn topic_to_address(topic: &str) -> Option<Address> {
    let hash = H256::from_str(topic.trim()).ok()?;
    if hash.as_bytes()[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from(hash))
}
