use crate::autogen::Context;

pub struct FetchRequest {
    pub key: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub value: Vec<u8>,
}

#[derive(Debug)]
pub struct Status {
    pub code: u32,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status {}", self.code)
    }
}

pub trait KvService {
    /// Fetches a value.
    fn fetch(&self, ctx: &Context, request: FetchRequest) -> Result<FetchResponse, Status>;
}
