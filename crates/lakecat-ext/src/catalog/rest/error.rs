use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

use http::StatusCode;
use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uuid::Uuid;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Failure reported by the metadata service.
///
/// Transports build one per non-2xx reply; the catalog inspects `code` to map
/// not-found and conflict replies onto its own taxonomy and passes everything
/// else through untouched.
#[derive(Default, Debug, TypedBuilder, Serialize, Deserialize)]
pub struct ErrorModel {
    #[builder(setter(into))]
    pub message: String,
    /// Error type as named by the service, e.g. `NoSuchTable`.
    #[builder(setter(into))]
    pub r#type: String,
    /// HTTP status of the reply.
    pub code: u16,
    #[serde(skip)]
    #[builder(default)]
    pub source: Option<BoxedSource>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[builder(default)]
    pub stack: Vec<String>,
    #[serde(skip)]
    #[builder(default = Uuid::now_v7())]
    pub error_id: Uuid,
}

macro_rules! status_constructors {
    ($($name:ident => $status:ident),* $(,)?) => {
        impl ErrorModel {
            $(
                pub fn $name(
                    message: impl Into<String>,
                    r#type: impl Into<String>,
                    source: Option<BoxedSource>,
                ) -> Self {
                    Self::new(message, r#type, StatusCode::$status.as_u16(), source)
                }
            )*
        }
    };
}

status_constructors! {
    not_found => NOT_FOUND,
    conflict => CONFLICT,
    forbidden => FORBIDDEN,
    service_unavailable => SERVICE_UNAVAILABLE,
}

impl ErrorModel {
    pub fn new(
        message: impl Into<String>,
        r#type: impl Into<String>,
        code: u16,
        source: Option<BoxedSource>,
    ) -> Self {
        Self::builder()
            .message(message)
            .r#type(r#type)
            .code(code)
            .source(source)
            .build()
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code == StatusCode::NOT_FOUND.as_u16()
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.code == StatusCode::CONFLICT.as_u16()
    }

    #[must_use]
    pub fn append_detail(mut self, detail: impl Into<String>) -> Self {
        self.stack.push(detail.into());
        self
    }

    pub fn append_detail_mut(&mut self, detail: impl Into<String>) {
        self.stack.push(detail.into());
    }
}

impl StdError for ErrorModel {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl Display for ErrorModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({}): {}", self.r#type, self.code, self.message)?;

        if !self.stack.is_empty() {
            writeln!(f, "Stack:")?;
            for detail in &self.stack {
                writeln!(f, "  {detail}")?;
            }
        }

        let mut cause: Option<&(dyn StdError + 'static)> = self
            .source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static));
        if cause.is_some() {
            writeln!(f, "Caused by:")?;
        }
        while let Some(e) = cause {
            writeln!(f, "\t{e}")?;
            cause = e.source();
        }

        Ok(())
    }
}
