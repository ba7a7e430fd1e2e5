//! Per-service operation codes.
//!
//! Each service kind switches on a 16-bit operation code carried in its
//! request header. Decoding is total: unknown codes come back as `None` and
//! the service replies not-supported without side effects.

macro_rules! opcode_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u16)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Decode an operation code. Unknown codes are `None`.
            pub fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Wire encoding of the operation code.
            pub fn as_u16(self) -> u16 {
                self as u16
            }
        }
    };
}

opcode_enum! {
    /// Multi-part hash operations.
    HashOp {
        /// Bind the context to an algorithm.
        Setup = 1,
        /// Feed input data (chunked).
        Update = 2,
        /// Produce the digest and reset the context.
        Finish = 3,
        /// Compare the digest against an expected value.
        Verify = 4,
        /// Reset the context, discarding state.
        Abort = 5,
        /// Reserve a clone slot for this context's state.
        CloneBegin = 6,
        /// Copy a reserved source state into this context.
        CloneEnd = 7,
    }
}

opcode_enum! {
    /// Multi-part MAC operations.
    MacOp {
        /// Bind the context to a key and algorithm for signing.
        SignSetup = 1,
        /// Bind the context to a key and algorithm for verification.
        VerifySetup = 2,
        /// Feed input data (chunked).
        Update = 3,
        /// Produce the MAC.
        SignFinish = 4,
        /// Compare against an expected MAC.
        VerifyFinish = 5,
        /// Reset the context, discarding state.
        Abort = 6,
    }
}

opcode_enum! {
    /// Multi-part symmetric cipher operations.
    CipherOp {
        /// Bind the context to a key and algorithm for encryption.
        EncryptSetup = 1,
        /// Bind the context to a key and algorithm for decryption.
        DecryptSetup = 2,
        /// Generate and return a fresh IV.
        GenerateIv = 3,
        /// Set the IV explicitly.
        SetIv = 4,
        /// Transform one buffer of data.
        Update = 5,
        /// Finalize and emit any remaining output.
        Finish = 6,
        /// Reset the context, discarding state.
        Abort = 7,
    }
}

opcode_enum! {
    /// One-shot asymmetric operations.
    AsymOp {
        /// Sign a precomputed hash.
        Sign = 1,
        /// Verify a signature over a precomputed hash.
        Verify = 2,
        /// Asymmetric encryption.
        Encrypt = 3,
        /// Asymmetric decryption.
        Decrypt = 4,
    }
}

opcode_enum! {
    /// One-shot AEAD operations.
    AeadOp {
        /// Authenticated encryption with associated data.
        Encrypt = 1,
        /// Authenticated decryption with associated data.
        Decrypt = 2,
    }
}

opcode_enum! {
    /// Key lifecycle operations.
    KeyOp {
        /// Read a key's lifetime.
        GetLifetime = 1,
        /// Set a key's usage policy.
        SetPolicy = 2,
        /// Read a key's usage policy.
        GetPolicy = 3,
        /// Import key material into an allocated handle.
        Import = 4,
        /// Destroy a key and its material.
        Destroy = 5,
        /// Read a key's type and size.
        GetInfo = 6,
        /// Export key material.
        Export = 7,
        /// Export the public half of a key pair.
        ExportPublic = 8,
        /// Generate key material into an allocated handle.
        Generate = 9,
        /// Allocate a fresh volatile key handle.
        Allocate = 10,
        /// Create a named persistent key.
        Create = 11,
        /// Open an existing named persistent key.
        Open = 12,
        /// Close a handle without destroying the key.
        Close = 13,
    }
}

opcode_enum! {
    /// Key derivation and agreement operations.
    DerivationOp {
        /// Query remaining derivation capacity.
        GetCapacity = 1,
        /// Read derived bytes.
        Read = 2,
        /// Import derived material into a key handle.
        ImportKey = 3,
        /// Reset the derivation context.
        Abort = 4,
        /// Start a key derivation from a base key.
        Derive = 5,
        /// Start a key agreement with a peer key.
        Agree = 6,
    }
}
