pub mod framing;
pub mod group_info;
pub mod proposal;
pub mod welcome;


pub use framing::{
    Content, ContentType, MLSCiphertext, MLSPlaintext, Sender, SenderType, GroupID,
    ProtocolVersion, PROTOCOL_VERSION_MLS10,
};
pub use group_info::GroupInfo;
pub use proposal::{Add, Commit, Proposal, ProposalId, Remove, Update};
pub use welcome::{EncryptedGroupSecrets, GroupSecrets, HpkeCiphertext, Welcome};
