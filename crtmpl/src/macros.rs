/// Hidden utility module for the [`context!`](crate::context!) macro.
#[doc(hidden)]
pub mod __context {
    use crate::value::{Value, ValueMap, ValueRepr};

    #[inline(always)]
    pub fn make() -> ValueMap {
        ValueMap::default()
    }

    #[inline(always)]
    pub fn add(ctx: &mut ValueMap, key: &'static str, value: Value) {
        ctx.insert(key.into(), value);
    }

    #[inline(always)]
    pub fn build(ctx: ValueMap) -> Value {
        Value::from_map(ctx)
    }

    /// Merges mappings and records into one mapping.
    ///
    /// The first value that provides a key wins.  Values that are neither
    /// mappings nor records are ignored.
    pub fn merge<I: IntoIterator<Item = Value>>(values: I) -> Value {
        let mut rv = ValueMap::default();
        for value in values {
            match value.0 {
                ValueRepr::Map(ref m) => {
                    for (key, value) in m.iter() {
                        if !rv.contains_key(key) {
                            rv.insert(key.clone(), value.clone());
                        }
                    }
                }
                ValueRepr::Record(ref r) => {
                    for (key, value) in r.fields.iter() {
                        if !rv.contains_key(*key) {
                            rv.insert((*key).into(), value.clone());
                        }
                    }
                }
                _ => {}
            }
        }
        Value::from_map(rv)
    }
}

/// Creates a template context from keys and values or merging in another value.
///
/// ```rust
/// # use crtmpl::context;
/// let ctx = context!{
///     name => "Peter",
///     location => "World",
/// };
/// ```
///
/// Alternatively if the variable name matches the key name it can
/// be omitted:
///
/// ```rust
/// # use crtmpl::context;
/// let name = "Peter";
/// let ctx = context!{ name };
/// ```
///
/// The return value is a [`Value`](crate::value::Value) holding a mapping.
/// Contexts nest, which is how data for dotted paths is usually built:
///
/// ```rust
/// # use crtmpl::{context, render};
/// let ctx = context! {
///     context => context!(width => 80),
///     controls => vec![
///         context!(rendername => "Reply", control_function => "reply"),
///         context!(rendername => "Done", control_function => "done"),
///     ]
/// };
/// let rv = render("{context.width}:{/controls}[{.rendername}]{/controls}", &ctx).unwrap();
/// assert_eq!(rv, "80:[Reply][Done]");
/// ```
///
/// Other mappings or records can be merged in with a leading `..`.  The
/// order of precedence is left to right:
///
/// ```rust
/// # use crtmpl::context;
/// let defaults = context! { color => "red", width => 80 };
/// let ctx = context! { color => "blue", ..defaults };
/// assert_eq!(ctx.get_attr("color").unwrap().as_str(), Some("blue"));
/// assert!(ctx.get_attr("width").is_some());
/// ```
///
/// # Note on Conversions
///
/// This macro uses [`Value::from_serialize`](crate::value::Value::from_serialize)
/// for conversions.  Values are not moved, pass `&value` to make this
/// explicit.
#[macro_export]
macro_rules! context {
    () => {
        $crate::__context::build($crate::__context::make())
    };
    (
        $($key:ident $(=> $value:expr)?),*
        $(, .. $ctx:expr)* $(,)?
    ) => {{
        let mut ctx = $crate::__context::make();
        $(
            $crate::__context_pair!(ctx, $key $(=> $value)?);
        )*
        let ctx = $crate::__context::build(ctx);
        let merge_ctx = [
            $(
                $crate::value::Value::from_serialize(&$ctx),
            )*
        ];
        if merge_ctx.is_empty() {
            ctx
        } else {
            $crate::__context::merge(::std::iter::once(ctx).chain(merge_ctx))
        }
    }};
    (
        $(.. $ctx:expr),* $(,)?
    ) => {{
        $crate::__context::merge([
            $(
                $crate::value::Value::from_serialize(&$ctx),
            )*
        ])
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __context_pair {
    ($ctx:ident, $key:ident) => {{
        $crate::__context_pair!($ctx, $key => $key);
    }};
    ($ctx:ident, $key:ident => $value:expr) => {
        $crate::__context::add(
            &mut $ctx,
            stringify!($key),
            $crate::value::Value::from_serialize(&$value),
        );
    };
}

/// A macro similar to [`format!`] but that renders a template.
///
/// The template is parsed every time the macro is invoked.  Context
/// variables are passed the same way as with the [`context!`](crate::context)
/// macro.
///
/// ```
/// # use crtmpl::render;
/// let name = "World";
/// assert_eq!(render!("Hello {name}!", name), "Hello World!");
/// assert_eq!(render!("{/xs}{.}{/xs}", xs => [1, 2, 3]), "123");
/// ```
///
/// # Panics
///
/// This macro panics if the template is malformed or rendering failed.
#[macro_export]
macro_rules! render {
    (
        $tmpl:expr
        $(, $key:ident $(=> $value:expr)?)* $(,)?
    ) => {
        $crate::render($tmpl, $crate::context! { $($key $(=> $value)? ,)* })
            .expect("failed to render template")
    };
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use crate::value::Value;

    #[test]
    fn test_context_merge_precedence() {
        let base = context!(a => 1, b => 2);
        let ctx = context!(a => 0, ..base, ..context!(c => 3));
        assert_eq!(ctx.get_attr("a"), Some(Value::from(0)));
        assert_eq!(ctx.get_attr("b"), Some(Value::from(2)));
        assert_eq!(ctx.get_attr("c"), Some(Value::from(3)));
    }

    #[test]
    fn test_context_merge_record() {
        #[derive(serde::Serialize)]
        struct Settings {
            width: u32,
        }

        let ctx = context!(..Settings { width: 80 });
        assert_eq!(ctx.get_attr("width"), Some(Value::from(80)));
    }

    #[test]
    fn test_render_macro() {
        let color = "red";
        assert_eq!(render!("<b style=\"color:{color}\">", color), "<b style=\"color:red\">");
    }
}
