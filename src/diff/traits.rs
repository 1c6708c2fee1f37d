//! Utility traits for diff processing.

/// Extension trait for converting bytes to UTF-8 strings
pub trait Utf8String {
  fn to_utf8(&self) -> String;
}

impl Utf8String for Vec<u8> {
  fn to_utf8(&self) -> String {
    self.as_slice().to_utf8()
  }
}

impl Utf8String for [u8] {
  fn to_utf8(&self) -> String {
    // Fast path for valid UTF-8 (most common case)
    if let Ok(s) = std::str::from_utf8(self) {
      return s.to_string();
    }
    String::from_utf8_lossy(self).into_owned()
  }
}
