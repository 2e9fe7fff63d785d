/// The controller serving a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// Buffers the generated body and sends it through the host in one go.
    Chunked,
    /// Streams the generated body as it is produced.
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PublicResponse,
    PrivateResponse,
}

impl Action {
    pub fn requires_auth(&self) -> bool {
        matches!(self, Action::PrivateResponse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Action(Controller, Action),
    NotFound,
    MethodNotAllowed,
}

impl Route {
    /// Resolve a request target. Only `GET` is routed; the query string is
    /// ignored.
    pub fn resolve(method: &[u8], target: &[u8]) -> Self {
        let path = target
            .split(|b| *b == b'?')
            .next()
            .unwrap_or_default();

        let (controller, action) = match path {
            b"/chunked/public_response" => (Controller::Chunked, Action::PublicResponse),
            b"/chunked/private_response" => (Controller::Chunked, Action::PrivateResponse),
            b"/live/public_response" => (Controller::Live, Action::PublicResponse),
            b"/live/private_response" => (Controller::Live, Action::PrivateResponse),
            _ => return Route::NotFound,
        };

        if method != b"GET" {
            return Route::MethodNotAllowed;
        }
        Route::Action(controller, action)
    }
}

#[cfg(test)]
mod test {
    use super::{Action, Controller, Route};

    #[test]
    fn resolves_known_routes() {
        assert_eq!(
            Route::Action(Controller::Chunked, Action::PublicResponse),
            Route::resolve(b"GET", b"/chunked/public_response")
        );
        assert_eq!(
            Route::Action(Controller::Live, Action::PrivateResponse),
            Route::resolve(b"GET", b"/live/private_response?verbose=1")
        );
    }

    #[test]
    fn rejects_the_rest() {
        assert_eq!(Route::NotFound, Route::resolve(b"GET", b"/"));
        assert_eq!(Route::NotFound, Route::resolve(b"GET", b"/live/public_response/"));
        assert_eq!(
            Route::MethodNotAllowed,
            Route::resolve(b"POST", b"/live/public_response")
        );
    }

    #[test]
    fn only_private_actions_need_auth() {
        assert!(Action::PrivateResponse.requires_auth());
        assert!(!Action::PublicResponse.requires_auth());
    }
}
