pub mod nist;
