/// Versioned cluster configuration agreed on by the acceptors.
///
/// The acceptor stores and returns layouts verbatim; the only thing
/// it ever reads from one is the epoch it is stamped with.
pub trait Layout: Clone
    + std::fmt::Debug
    + Eq
    + Send
    + Sync
    + serde::Serialize
    + serde::de::DeserializeOwned
    + 'static
{
    /// Epoch this layout was issued for.
    fn epoch(&self) -> u64;
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_derive::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct TestLayout {
        pub epoch: u64,
        pub servers: Vec<String>,
    }

    impl TestLayout {
        pub fn single(port: u16) -> Self {
            TestLayout {
                epoch: 0,
                servers: vec![format!("localhost:{}", port)],
            }
        }

        pub fn at(mut self, epoch: u64) -> Self {
            self.epoch = epoch;
            self
        }
    }

    impl super::Layout for TestLayout {
        fn epoch(&self) -> u64 {
            self.epoch
        }
    }
}
