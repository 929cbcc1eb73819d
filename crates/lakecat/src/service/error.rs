use std::convert::Infallible;

use http::StatusCode;
use lakecat_ext::catalog::rest::ErrorModel;

use super::Identifier;

macro_rules! impl_error_stack_methods {
    ($error_type:ty) => {
        impl $error_type {
            #[must_use]
            pub fn append_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
                self.stack.extend(details);
                self
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
    };
}

macro_rules! impl_from_with_detail {
    ($from_type:ty => $to_type:ident::$variant:ident, $detail:expr) => {
        impl From<$from_type> for $to_type {
            fn from(err: $from_type) -> Self {
                $to_type::$variant(err.append_detail($detail))
            }
        }
    };
}

/// Defines a fully transparent error enum with automatic conversion implementations.
///
/// This macro generates:
/// - An enum with all variants marked as `#[error(transparent)]`
/// - `impl_from_with_detail!` for each variant to add stack context
/// - a plain `From` for each `passthrough` variant, which is wrapped as-is
/// - `From<ErrorType> for ErrorModel` that delegates to variant conversions
macro_rules! define_transparent_error {
    (
        $(#[$meta:meta])*
        $vis:vis enum $error_name:ident,
        stack_message: $stack_msg:expr,
        variants: [
            $($variant:ident($variant_ty:ty)),* $(,)?
        ],
        passthrough: [
            $($pass_variant:ident($pass_ty:ty)),* $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(thiserror::Error, Debug)]
        $vis enum $error_name {
            $(
                #[error(transparent)]
                $variant($variant_ty),
            )*
            $(
                #[error(transparent)]
                $pass_variant($pass_ty),
            )*
        }

        $(
            impl From<$pass_ty> for $error_name {
                fn from(err: $pass_ty) -> Self {
                    $error_name::$pass_variant(err)
                }
            }
        )*

        pastey::paste! {
            const [<$error_name:snake:upper _STACK>]: &str = $stack_msg;

            $(
                impl_from_with_detail!($variant_ty => $error_name::$variant, [<$error_name:snake:upper _STACK>]);
            )*

            impl $error_name {
                #[must_use]
                pub fn append_detail(mut self, detail: impl Into<String>) -> Self {
                    self.append_detail_mut(detail);
                    self
                }

                pub fn append_detail_mut(&mut self, detail: impl Into<String>) -> &mut Self {
                    match self {
                        $(
                            $error_name::$variant(e) => {
                                e.append_detail_mut(detail);
                            }
                        )*
                        $(
                            $error_name::$pass_variant(e) => {
                                e.append_detail_mut(detail);
                            }
                        )*
                    }
                    self
                }
            }

            impl From<$error_name> for ErrorModel {
                fn from(err: $error_name) -> Self {
                    match err {
                        $(
                            $error_name::$variant(e) => e.into(),
                        )*
                        $(
                            $error_name::$pass_variant(e) => e,
                        )*
                    }
                }
            }
        }
    };
}

macro_rules! define_simple_error {
    ($error_name:ident, $error_message:literal) => {
        #[derive(thiserror::Error, Debug, PartialEq)]
        #[error($error_message)]
        pub struct $error_name {
            pub stack: Vec<String>,
        }

        impl Default for $error_name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $error_name {
            #[must_use]
            pub fn new() -> Self {
                Self { stack: Vec::new() }
            }
        }

        impl_error_stack_methods!($error_name);
    };
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

define_transparent_error! {
    /// Every failure a catalog operation can surface to its caller.
    pub enum CatalogError,
    stack_message: "Error in catalog operation",
    variants: [
        DatabaseNotFound(DatabaseNotFound),
        TableNotFound(TableNotFound),
        DatabaseAlreadyExists(DatabaseAlreadyExists),
        MalformedIdentifier(MalformedIdentifier),
        UnsupportedOperation(UnsupportedOperation),
        Credential(CredentialError),
        InvalidLocation(InvalidLocation),
        InvalidConfig(InvalidConfig),
    ],
    passthrough: [
        RemoteService(ErrorModel),
    ]
}

impl CatalogError {
    /// `true` if a database or table the operation addressed does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::DatabaseNotFound(_) | CatalogError::TableNotFound(_)
        )
    }
}

impl From<Infallible> for CatalogError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

// --------------------------- NOT FOUND ---------------------------
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Database `{database}` does not exist")]
pub struct DatabaseNotFound {
    pub database: String,
    pub stack: Vec<String>,
}

impl DatabaseNotFound {
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(DatabaseNotFound);

impl From<DatabaseNotFound> for ErrorModel {
    fn from(err: DatabaseNotFound) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("DatabaseNotFound")
            .code(StatusCode::NOT_FOUND.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Table `{identifier}` does not exist")]
pub struct TableNotFound {
    pub identifier: Identifier,
    pub stack: Vec<String>,
}

impl TableNotFound {
    #[must_use]
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(TableNotFound);

impl From<TableNotFound> for ErrorModel {
    fn from(err: TableNotFound) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("TableNotFound")
            .code(StatusCode::NOT_FOUND.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

// --------------------------- CONFLICT ---------------------------
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Database `{database}` already exists")]
pub struct DatabaseAlreadyExists {
    pub database: String,
    pub stack: Vec<String>,
}

impl DatabaseAlreadyExists {
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(DatabaseAlreadyExists);

impl From<DatabaseAlreadyExists> for ErrorModel {
    fn from(err: DatabaseAlreadyExists) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("DatabaseAlreadyExists")
            .code(StatusCode::CONFLICT.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

// --------------------------- BAD INPUT ---------------------------
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Malformed identifier `{input}`: {reason}")]
pub struct MalformedIdentifier {
    pub input: String,
    pub reason: &'static str,
    pub stack: Vec<String>,
}

impl MalformedIdentifier {
    #[must_use]
    pub fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(MalformedIdentifier);

impl From<MalformedIdentifier> for ErrorModel {
    fn from(err: MalformedIdentifier) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("MalformedIdentifier")
            .code(StatusCode::BAD_REQUEST.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Invalid storage location `{value}`: {reason}")]
pub struct InvalidLocation {
    pub value: String,
    pub reason: String,
    pub stack: Vec<String>,
}

impl InvalidLocation {
    #[must_use]
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(InvalidLocation);

impl From<InvalidLocation> for ErrorModel {
    fn from(err: InvalidLocation) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("InvalidLocation")
            .code(StatusCode::BAD_GATEWAY.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Invalid catalog configuration: {message}")]
pub struct InvalidConfig {
    pub message: String,
    pub stack: Vec<String>,
}

impl InvalidConfig {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(InvalidConfig);

impl From<InvalidConfig> for ErrorModel {
    fn from(err: InvalidConfig) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("InvalidConfig")
            .code(StatusCode::BAD_REQUEST.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

// --------------------------- UNSUPPORTED ---------------------------
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Operation `{operation}` is not supported by this catalog client")]
pub struct UnsupportedOperation {
    pub operation: &'static str,
    pub stack: Vec<String>,
}

impl UnsupportedOperation {
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(UnsupportedOperation);

impl From<UnsupportedOperation> for ErrorModel {
    fn from(err: UnsupportedOperation) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("UnsupportedOperation")
            .code(StatusCode::NOT_IMPLEMENTED.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

// --------------------------- CREDENTIALS ---------------------------
#[derive(thiserror::Error, Debug)]
#[error("Failed to obtain data token for table `{identifier}`")]
pub struct CredentialError {
    pub identifier: Identifier,
    #[source]
    pub source: ErrorModel,
    pub stack: Vec<String>,
}

impl CredentialError {
    #[must_use]
    pub fn new(identifier: Identifier, source: ErrorModel) -> Self {
        Self {
            identifier,
            source,
            stack: Vec::new(),
        }
    }
}
impl_error_stack_methods!(CredentialError);

impl From<CredentialError> for ErrorModel {
    fn from(err: CredentialError) -> Self {
        let message = err.to_string();
        let CredentialError { source, stack, .. } = err;
        ErrorModel::builder()
            .r#type("CredentialError")
            .code(StatusCode::PRECONDITION_FAILED.as_u16())
            .message(message)
            .stack(stack)
            .source(Some(Box::new(source)))
            .build()
    }
}

define_simple_error!(
    TokenExpiredOnArrival,
    "Data token returned by the metadata service is already expired"
);

impl From<TokenExpiredOnArrival> for ErrorModel {
    fn from(err: TokenExpiredOnArrival) -> Self {
        let message = err.to_string();
        ErrorModel::builder()
            .r#type("TokenExpiredOnArrival")
            .code(StatusCode::BAD_GATEWAY.as_u16())
            .message(message)
            .stack(err.stack)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_not_found_classification() {
        let db: CatalogError = DatabaseNotFound::new("db").into();
        let table: CatalogError =
            TableNotFound::new(Identifier::new("db", "t").unwrap()).into();
        let unsupported: CatalogError = UnsupportedOperation::new("create_table").into();

        assert!(db.is_not_found());
        assert!(table.is_not_found());
        assert!(!unsupported.is_not_found());
    }

    #[test]
    fn test_conversion_appends_stack_detail() {
        let err: CatalogError = DatabaseNotFound::new("db").into();
        let err = err.append_detail("while loading db");
        let CatalogError::DatabaseNotFound(inner) = &err else {
            panic!("unexpected variant: {err:?}");
        };
        assert_eq!(
            inner.stack,
            vec![
                "Error in catalog operation".to_string(),
                "while loading db".to_string()
            ]
        );

        let model = ErrorModel::from(err);
        assert_eq!(model.code, 404);
        assert_eq!(model.r#type, "DatabaseNotFound");
        assert_eq!(model.message, "Database `db` does not exist");
    }

    #[test]
    fn test_remote_error_is_propagated_unchanged() {
        let remote = ErrorModel::service_unavailable("backend down", "ServiceUnavailable", None);
        let error_id = remote.error_id;
        let err = CatalogError::from(remote);
        let CatalogError::RemoteService(inner) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(inner.stack.is_empty(), "{:?}", inner.stack);
        let model = ErrorModel::from(err);
        assert_eq!(model.code, 503);
        assert_eq!(model.r#type, "ServiceUnavailable");
        assert_eq!(model.message, "backend down");
        assert!(model.stack.is_empty());
        assert_eq!(model.error_id, error_id);
    }

    #[test]
    fn test_credential_error_keeps_source() {
        let err = CredentialError::new(
            Identifier::new("db", "t").unwrap(),
            ErrorModel::forbidden("no token for you", "Forbidden", None),
        );
        assert!(err.source().is_some());
        let model = ErrorModel::from(err);
        assert_eq!(model.code, 412);
        assert!(model.to_string().contains("no token for you"));
    }
}
