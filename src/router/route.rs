use std::sync::Arc;

use indexmap::IndexMap;

use crate::identifier::Identifier;

use super::{BoxedMatcher, Matcher, RouteError};

/// An immutable route description: methods, path pattern, target and
/// parameter matchers.
///
/// Every builder method returns a new route and leaves `self` as it was:
///
/// ```rust
/// use adroit::router::{NumericMatcher, Route};
///
/// let base = Route::get().from("/user/[:id]").to("user.show");
/// let strict = base.if_matches("id", NumericMatcher).accepting("head");
///
/// assert_eq!(base.methods(), ["GET"]);
/// assert_eq!(strict.methods(), ["GET", "HEAD"]);
/// assert!(base.matchers("id").is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Route {
    methods: Vec<String>,
    path: Option<String>,
    target: Option<Identifier>,
    matchers: IndexMap<String, Vec<BoxedMatcher>>,
}

macro_rules! method_constructors {
    ($($fn_name:ident => $method:literal),+ $(,)?) => {
        $(
            #[doc = concat!("A route accepting `", $method, "`.")]
            pub fn $fn_name() -> Self {
                Self::new().accepting($method)
            }
        )+
    };
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// A complete route in one call.
    pub fn create<I, M>(methods: I, path: impl Into<String>, target: impl Into<Identifier>) -> Self
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
    {
        let route = methods
            .into_iter()
            .fold(Self::new(), |route, method| route.accepting(method.as_ref()));
        route.from(path).to(target)
    }

    method_constructors! {
        get => "GET",
        post => "POST",
        put => "PUT",
        delete => "DELETE",
        patch => "PATCH",
        head => "HEAD",
        options => "OPTIONS",
    }

    /// Adds a method, normalised to upper case.
    pub fn accepting(&self, method: &str) -> Self {
        let method = method.to_ascii_uppercase();
        let mut new = self.clone();
        if !new.methods.contains(&method) {
            new.methods.push(method);
        }
        new
    }

    pub fn refusing(&self, method: &str) -> Self {
        let method = method.to_ascii_uppercase();
        let mut new = self.clone();
        new.methods.retain(|m| *m != method);
        new
    }

    pub fn from(&self, path: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.path = Some(path.into());
        new
    }

    pub fn to(&self, target: impl Into<Identifier>) -> Self {
        let mut new = self.clone();
        new.target = Some(target.into());
        new
    }

    /// Adds a matcher for the parameter `param`. All matchers of a
    /// parameter must accept its value.
    pub fn if_matches(&self, param: impl Into<String>, matcher: impl Matcher) -> Self {
        let mut new = self.clone();
        new.matchers
            .entry(param.into())
            .or_default()
            .push(Arc::new(matcher));
        new
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn target(&self) -> Option<&Identifier> {
        self.target.as_ref()
    }

    /// Matchers configured for `param`; empty when there are none.
    pub fn matchers(&self, param: &str) -> &[BoxedMatcher] {
        self.matchers.get(param).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all_matchers(&self) -> &IndexMap<String, Vec<BoxedMatcher>> {
        &self.matchers
    }

    /// Checks that the route has a path, a target and at least one method.
    pub fn validate(&self) -> Result<(), RouteError> {
        let path = self.path.as_deref().filter(|p| !p.is_empty()).ok_or(RouteError::MissingPath)?;
        if self.target.as_ref().is_none_or(Identifier::is_empty) {
            return Err(RouteError::MissingTarget { path: path.to_owned() });
        }
        if self.methods.is_empty() {
            return Err(RouteError::NoMethods { path: path.to_owned() });
        }
        Ok(())
    }
}
