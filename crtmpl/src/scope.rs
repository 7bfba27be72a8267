use crate::error::{Error, ErrorKind};
use crate::value::{Value, ValueKind};

/// Resolves a dotted lookup path.
///
/// The path is split on `.`.  A path with a leading dot (`.author`) is
/// resolved against `local`, the value of the innermost loop iteration.
/// Any other path starts with a name looked up in `bindings`.  The empty
/// path and `.` resolve to `local` itself.
///
/// Every following segment indexes a mapping by key or reads a field of
/// a record.  This includes empty segments, so `m.` looks up the key `""`
/// in `m` rather than resolving to `m`.
///
/// ```
/// # use crtmpl::{context, resolve, value::Value};
/// let bindings = context!(context => context!(width => 80));
/// let width = resolve("context.width", &Value::from(()), &bindings).unwrap();
/// assert_eq!(width, Value::from(80));
///
/// let local = context!(author => "Ted");
/// let author = resolve(".author", &local, &bindings).unwrap();
/// assert_eq!(author, Value::from("Ted"));
/// ```
///
/// Resolution never modifies `local` or `bindings`.  A missing binding,
/// key or field fails with [`ErrorKind::UndefinedError`].
pub fn resolve(path: &str, local: &Value, bindings: &Value) -> Result<Value, Error> {
    let mut rv = local.clone();
    if !path.is_empty() && path != "." {
        let mut segments = path.split('.');
        if let Some(name) = segments.next().filter(|x| !x.is_empty()) {
            rv = lookup_binding(bindings, name)?;
        }
        for segment in segments {
            rv = lookup_segment(&rv, segment)?;
        }
    }
    rv.validate()?;
    Ok(rv)
}

fn lookup_binding(bindings: &Value, name: &str) -> Result<Value, Error> {
    bindings.validate()?;
    match bindings.kind() {
        ValueKind::Map | ValueKind::Record | ValueKind::None => {
            bindings.get_attr(name).ok_or_else(|| {
                Error::new(
                    ErrorKind::UndefinedError,
                    format!("binding `{}` is not defined", name),
                )
            })
        }
        _ => Err(Error::new(
            ErrorKind::InvalidOperation,
            "bindings must be a mapping or a record",
        )),
    }
}

fn lookup_segment(value: &Value, segment: &str) -> Result<Value, Error> {
    value.validate()?;
    value.get_attr(segment).ok_or_else(|| {
        let detail = match value.kind() {
            ValueKind::Map => format!("mapping has no key `{}`", segment),
            ValueKind::Record => format!("record has no field `{}`", segment),
            kind => format!("value of type {} has no field `{}`", kind, segment),
        };
        Error::new(ErrorKind::UndefinedError, detail)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    use crate::context;

    fn bindings() -> Value {
        context! {
            user => context!(name => "Ted", tags => vec!["a", "b"]),
            width => 80,
        }
    }

    #[test]
    fn test_bindings_paths() {
        let none = Value::from(());
        assert_eq!(resolve("width", &none, &bindings()).unwrap(), Value::from(80));
        assert_eq!(
            resolve("user.name", &none, &bindings()).unwrap(),
            Value::from("Ted")
        );
    }

    #[test]
    fn test_empty_segments_are_looked_up() {
        let none = Value::from(());
        let err = resolve("user.name.", &none, &bindings()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedError);
        assert_eq!(err.detail(), Some("value of type string has no field ``"));

        let err = resolve("user..name", &none, &bindings()).unwrap_err();
        assert_eq!(err.detail(), Some("mapping has no key ``"));

        let bindings: Value = [("m", [("", 5), ("a", 1)].into_iter().collect::<Value>())]
            .into_iter()
            .collect();
        assert_eq!(resolve("m.", &none, &bindings).unwrap(), Value::from(5));
        assert!(resolve("m..a", &none, &bindings).is_err());
    }

    #[test]
    fn test_local_paths() {
        let local = context!(author => "Ann");
        assert_eq!(resolve("", &local, &bindings()).unwrap(), local);
        assert_eq!(resolve(".", &local, &bindings()).unwrap(), local);
        assert_eq!(
            resolve(".author", &local, &bindings()).unwrap(),
            Value::from("Ann")
        );
    }

    #[test]
    fn test_leading_dot_never_reads_bindings() {
        let err = resolve(".width", &context!(), &bindings()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedError);
        assert_eq!(err.detail(), Some("mapping has no key `width`"));
    }

    #[test]
    fn test_missing() {
        let none = Value::from(());
        let err = resolve("missing", &none, &bindings()).unwrap_err();
        assert_eq!(err.detail(), Some("binding `missing` is not defined"));

        let err = resolve("width.digits", &none, &bindings()).unwrap_err();
        assert_eq!(
            err.detail(),
            Some("value of type number has no field `digits`")
        );

        let err = resolve("x", &none, &Value::from(())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedError);

        let err = resolve("x", &none, &Value::from(vec![1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_record_fields() {
        #[derive(serde::Serialize)]
        struct Comment {
            author: &'static str,
        }

        let local = Value::from_serialize(&Comment { author: "Ted" });
        let none = Value::from(());
        assert_eq!(
            resolve(".author", &local, &none).unwrap(),
            Value::from("Ted")
        );
        let err = resolve(".content", &local, &none).unwrap_err();
        assert_eq!(err.detail(), Some("record has no field `content`"));
    }
}
