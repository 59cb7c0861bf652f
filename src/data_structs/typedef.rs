pub type GeneId = String;
pub type SeqId = String;
pub type PosType = u64;
