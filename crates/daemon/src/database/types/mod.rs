mod dpublic_key;

pub use dpublic_key::DPublicKey;
