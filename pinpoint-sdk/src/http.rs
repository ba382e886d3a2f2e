//! HTTP-facing helpers: request exclusion filters, status-code error
//! matching and header recording.
//!
//! All of these are rebuilt on config reload and sit behind swappable
//! slots in the agent, so they are plain immutable values here.

use pinpoint::annotation::Annotation;
use pinpoint::trace::HeaderReader;

/// Matches request paths against exclusion patterns.
///
/// Patterns are segment-wise: `*` matches exactly one path segment, a
/// trailing `**` matches any remainder, anything else compares verbatim.
pub struct HttpUrlFilter {
    patterns: Vec<Vec<String>>,
}

impl HttpUrlFilter {
    pub fn new(patterns: &[String]) -> HttpUrlFilter {
        HttpUrlFilter {
            patterns: patterns.iter().map(|p| split_segments(p)).collect(),
        }
    }

    pub fn is_filtered(&self, url: &str) -> bool {
        let path = url.split('?').next().unwrap_or(url);
        let segments = split_segments(path);
        self.patterns.iter().any(|p| match_segments(p, &segments))
    }
}

fn split_segments(path: &str) -> Vec<String> {
    path.trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn match_segments(pattern: &[String], segments: &[String]) -> bool {
    let mut i = 0;
    for p in pattern {
        if p == "**" {
            return true;
        }
        match segments.get(i) {
            Some(seg) if p == "*" || p == seg => i += 1,
            _ => return false,
        }
    }
    i == segments.len()
}

/// Matches HTTP methods against an exclusion list, case-insensitively.
pub struct HttpMethodFilter {
    methods: Vec<String>,
}

impl HttpMethodFilter {
    pub fn new(methods: &[String]) -> HttpMethodFilter {
        HttpMethodFilter {
            methods: methods.to_vec(),
        }
    }

    pub fn is_filtered(&self, method: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// Decides which HTTP status codes flag a span as errored.
///
/// Accepts exact codes (`"503"`) and century patterns (`"5xx"`).
pub struct HttpStatusErrors {
    exact: Vec<i32>,
    centuries: Vec<i32>,
}

impl HttpStatusErrors {
    pub fn new(patterns: &[String]) -> HttpStatusErrors {
        let mut exact = Vec::new();
        let mut centuries = Vec::new();
        for pattern in patterns {
            let p = pattern.trim();
            if let Some(hundreds) = p
                .strip_suffix("xx")
                .and_then(|prefix| prefix.parse::<i32>().ok())
            {
                centuries.push(hundreds);
            } else if let Ok(code) = p.parse::<i32>() {
                exact.push(code);
            }
        }
        HttpStatusErrors { exact, centuries }
    }

    pub fn is_error_code(&self, status: i32) -> bool {
        self.exact.contains(&status) || self.centuries.contains(&(status / 100))
    }
}

/// Marker meaning "record every header the reader yields".
const RECORD_ALL_HEADERS: &str = "headers-all";

/// Copies configured headers into span/event annotations.
pub struct HttpHeaderRecorder {
    annotation_key: i32,
    headers: Vec<String>,
    record_all: bool,
}

impl HttpHeaderRecorder {
    pub fn new(annotation_key: i32, headers: &[String]) -> HttpHeaderRecorder {
        let record_all = headers
            .first()
            .is_some_and(|h| h.eq_ignore_ascii_case(RECORD_ALL_HEADERS));
        HttpHeaderRecorder {
            annotation_key,
            headers: headers.to_vec(),
            record_all,
        }
    }

    pub fn record(&self, reader: &dyn HeaderReader, annotation: &Annotation) {
        if self.record_all {
            reader.for_each(&mut |name, value| {
                annotation.append_string_string(self.annotation_key, name, value);
                true
            });
            return;
        }
        for name in &self.headers {
            if let Some(value) = reader.get(name) {
                annotation.append_string_string(self.annotation_key, name, &value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint::annotation::{AnnotationValue, ANNOTATION_HTTP_REQUEST_HEADER};
    use std::collections::HashMap;

    struct MapHeaderReader(HashMap<String, String>);

    impl HeaderReader for MapHeaderReader {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn for_each(&self, f: &mut dyn FnMut(&str, &str) -> bool) {
            for (k, v) in &self.0 {
                if !f(k, v) {
                    break;
                }
            }
        }
    }

    #[test]
    fn url_filter_exact_and_wildcards() {
        let filter = HttpUrlFilter::new(&[
            "/health".to_string(),
            "/api/*/status".to_string(),
            "/internal/**".to_string(),
        ]);

        assert!(filter.is_filtered("/health"));
        assert!(filter.is_filtered("/health?probe=1"));
        assert!(!filter.is_filtered("/healthz"));
        assert!(filter.is_filtered("/api/v1/status"));
        assert!(!filter.is_filtered("/api/v1/v2/status"));
        assert!(filter.is_filtered("/internal/debug/vars"));
        assert!(!filter.is_filtered("/api/v1"));
    }

    #[test]
    fn method_filter_ignores_case() {
        let filter = HttpMethodFilter::new(&["PUT".to_string(), "delete".to_string()]);
        assert!(filter.is_filtered("put"));
        assert!(filter.is_filtered("DELETE"));
        assert!(!filter.is_filtered("GET"));
    }

    #[test]
    fn status_errors_match_exact_and_century() {
        let errors = HttpStatusErrors::new(&["5xx".to_string(), "401".to_string()]);
        assert!(errors.is_error_code(500));
        assert!(errors.is_error_code(503));
        assert!(errors.is_error_code(401));
        assert!(!errors.is_error_code(404));
        assert!(!errors.is_error_code(200));
    }

    #[test]
    fn header_recorder_records_configured_names() {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "*/*".to_string());
        headers.insert("Authorization".to_string(), "secret".to_string());
        let reader = MapHeaderReader(headers);

        let recorder =
            HttpHeaderRecorder::new(ANNOTATION_HTTP_REQUEST_HEADER, &["Accept".to_string()]);
        let annotation = Annotation::new();
        recorder.record(&reader, &annotation);

        assert_eq!(
            annotation.snapshot(),
            vec![(
                ANNOTATION_HTTP_REQUEST_HEADER,
                AnnotationValue::StringString("Accept".to_string(), "*/*".to_string())
            )]
        );
    }

    #[test]
    fn header_recorder_records_all_when_configured() {
        let mut headers = HashMap::new();
        headers.insert("a".to_string(), "1".to_string());
        headers.insert("b".to_string(), "2".to_string());
        let reader = MapHeaderReader(headers);

        let recorder = HttpHeaderRecorder::new(
            ANNOTATION_HTTP_REQUEST_HEADER,
            &["HEADERS-ALL".to_string()],
        );
        let annotation = Annotation::new();
        recorder.record(&reader, &annotation);
        assert_eq!(annotation.len(), 2);
    }
}
