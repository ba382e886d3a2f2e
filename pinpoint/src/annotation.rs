//! Typed key/value annotations attached to spans and span events.
//!
//! The bag is shared between the user-facing handle and the span data it
//! belongs to, so it uses interior mutability and is handed out as
//! `Arc<Annotation>`.

use std::sync::Mutex;

/// Well-known annotation keys understood by the collector.
pub const ANNOTATION_API: i32 = 12;
pub const ANNOTATION_SQL_ID: i32 = 20;
pub const ANNOTATION_SQL_UID: i32 = 25;
pub const ANNOTATION_HTTP_URL: i32 = 40;
pub const ANNOTATION_HTTP_COOKIE: i32 = 45;
pub const ANNOTATION_HTTP_STATUS_CODE: i32 = 46;
pub const ANNOTATION_HTTP_REQUEST_HEADER: i32 = 47;
pub const ANNOTATION_HTTP_RESPONSE_HEADER: i32 = 55;
pub const ANNOTATION_EXCEPTION_ID: i32 = -1;

/// One annotation value. Variants correspond one-to-one to the wire
/// representations the collector accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    Int(i32),
    Long(i64),
    String(String),
    StringString(String, String),
    IntStringString(i32, String, String),
    BytesStringString(Vec<u8>, String, String),
    LongIntIntByteByteString(i64, i32, i32, i32, i32, String),
}

/// Ordered, append-only annotation bag.
#[derive(Debug, Default)]
pub struct Annotation {
    entries: Mutex<Vec<(i32, AnnotationValue)>>,
}

impl Annotation {
    pub fn new() -> Annotation {
        Annotation::default()
    }

    fn push(&self, key: i32, value: AnnotationValue) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((key, value));
        }
    }

    pub fn append_int(&self, key: i32, value: i32) {
        self.push(key, AnnotationValue::Int(value));
    }

    pub fn append_long(&self, key: i32, value: i64) {
        self.push(key, AnnotationValue::Long(value));
    }

    pub fn append_string(&self, key: i32, value: &str) {
        self.push(key, AnnotationValue::String(value.to_string()));
    }

    pub fn append_string_string(&self, key: i32, value1: &str, value2: &str) {
        self.push(
            key,
            AnnotationValue::StringString(value1.to_string(), value2.to_string()),
        );
    }

    pub fn append_int_string_string(&self, key: i32, int_value: i32, value1: &str, value2: &str) {
        self.push(
            key,
            AnnotationValue::IntStringString(int_value, value1.to_string(), value2.to_string()),
        );
    }

    pub fn append_bytes_string_string(&self, key: i32, bytes: Vec<u8>, value1: &str, value2: &str) {
        self.push(
            key,
            AnnotationValue::BytesStringString(bytes, value1.to_string(), value2.to_string()),
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn append_long_int_int_byte_byte_string(
        &self,
        key: i32,
        long_value: i64,
        int_value1: i32,
        int_value2: i32,
        byte_value1: i32,
        byte_value2: i32,
        string_value: &str,
    ) {
        self.push(
            key,
            AnnotationValue::LongIntIntByteByteString(
                long_value,
                int_value1,
                int_value2,
                byte_value1,
                byte_value2,
                string_value.to_string(),
            ),
        );
    }

    /// Copies the current contents, preserving append order.
    pub fn snapshot(&self) -> Vec<(i32, AnnotationValue)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_types() {
        let bag = Annotation::new();
        bag.append_int(ANNOTATION_HTTP_STATUS_CODE, 200);
        bag.append_string(ANNOTATION_HTTP_URL, "/users");
        bag.append_string_string(ANNOTATION_HTTP_REQUEST_HEADER, "accept", "*/*");
        bag.append_int_string_string(ANNOTATION_SQL_ID, 7, "1,2", "a,b");

        let entries = bag.snapshot();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[0],
            (ANNOTATION_HTTP_STATUS_CODE, AnnotationValue::Int(200))
        );
        assert_eq!(
            entries[1],
            (
                ANNOTATION_HTTP_URL,
                AnnotationValue::String("/users".to_string())
            )
        );
        assert_eq!(
            entries[3],
            (
                ANNOTATION_SQL_ID,
                AnnotationValue::IntStringString(7, "1,2".to_string(), "a,b".to_string())
            )
        );
    }

    #[test]
    fn shared_bag_sees_all_appends() {
        let bag = std::sync::Arc::new(Annotation::new());
        let clone = bag.clone();
        clone.append_long(ANNOTATION_EXCEPTION_ID, 99);
        assert_eq!(bag.len(), 1);
        assert!(!bag.is_empty());
    }
}
