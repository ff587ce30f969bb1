// Ledger entry indexes derived from their identifying fields

use super::{sha512_half, AccountId, Hash256};

/// Ledger entry namespaces; each index hash is prefixed with the big-endian
/// 16-bit namespace code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Space {
    Account = b'a' as u16,
    DirNode = b'd' as u16,
    Offer = b'o' as u16,
    OwnerDir = b'O' as u16,
    RippleState = b'r' as u16,
}

impl Space {
    fn prefix(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }
}

pub fn account_root(account: &AccountId) -> Hash256 {
    sha512_half(&[&Space::Account.prefix(), account.as_bytes()])
}

/// Root page of the directory of objects owned by `account`.
pub fn owner_dir(account: &AccountId) -> Hash256 {
    sha512_half(&[&Space::OwnerDir.prefix(), account.as_bytes()])
}

/// Page `sub_index` of the directory rooted at `root`. Page 0 is the root.
pub fn dir_page(root: &Hash256, sub_index: u64) -> Hash256 {
    if sub_index == 0 {
        return *root;
    }
    sha512_half(&[
        &Space::DirNode.prefix(),
        root.as_bytes(),
        &sub_index.to_be_bytes(),
    ])
}

pub fn offer(account: &AccountId, seq: u32) -> Hash256 {
    sha512_half(&[&Space::Offer.prefix(), account.as_bytes(), &seq.to_be_bytes()])
}

/// Trust line between two accounts; symmetric in the account order.
pub fn ripple_state(a: &AccountId, b: &AccountId, currency: &str) -> Hash256 {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    sha512_half(&[
        &Space::RippleState.prefix(),
        low.as_bytes(),
        high.as_bytes(),
        currency.as_bytes(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_page_is_root() {
        let root = owner_dir(&AccountId::new([7u8; 20]));
        assert_eq!(dir_page(&root, 0), root);
        assert_ne!(dir_page(&root, 1), root);
        assert_ne!(dir_page(&root, 1), dir_page(&root, 2));
    }

    #[test]
    fn test_namespaces_separate_indexes() {
        let account = AccountId::new([1u8; 20]);
        assert_ne!(account_root(&account), owner_dir(&account));
        assert_ne!(offer(&account, 1), offer(&account, 2));
    }

    #[test]
    fn test_ripple_state_is_symmetric() {
        let a = AccountId::new([1u8; 20]);
        let b = AccountId::new([2u8; 20]);
        assert_eq!(ripple_state(&a, &b, "USD"), ripple_state(&b, &a, "USD"));
        assert_ne!(ripple_state(&a, &b, "USD"), ripple_state(&a, &b, "EUR"));
    }
}
