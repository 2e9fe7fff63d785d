use trickle_http_message::message::Request;

/// Whether `req` carries `authorization: Bearer <token>`. The scheme is
/// matched without regard to case, the token exactly.
pub fn authorized(req: &Request, token: &str) -> bool {
    let Some(value) = req.get_header("authorization") else {
        return false;
    };
    let Some((scheme, credentials)) = value.split_at_checked(6) else {
        return false;
    };

    scheme.eq_ignore_ascii_case(b"bearer")
        && credentials
            .strip_prefix(b" ")
            .is_some_and(|given| given.trim_ascii() == token.as_bytes())
}

#[cfg(test)]
mod test {
    use bytes::BytesMut;
    use trickle_http_message::message::Request;
    use trickle_util::buffer::Buffer;

    use super::authorized;

    fn request(authorization: Option<&str>) -> Request {
        let mut head = String::from("GET /live/private_response HTTP/1.1\r\nHost: x\r\n");
        if let Some(value) = authorization {
            head.push_str(&format!("Authorization: {value}\r\n"));
        }
        head.push_str("\r\n");

        let mut buf = Buffer::new(BytesMut::from(head.as_bytes()));
        Request::parse(&mut buf, 8).unwrap().expect("complete head")
    }

    #[test]
    fn accepts_bearer_token() {
        assert!(authorized(&request(Some("Bearer secret")), "secret"));
        assert!(authorized(&request(Some("bearer secret")), "secret"));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!authorized(&request(None), "secret"));
        assert!(!authorized(&request(Some("Bearer wrong")), "secret"));
        assert!(!authorized(&request(Some("Basic c2VjcmV0")), "secret"));
        assert!(!authorized(&request(Some("Bearer")), "secret"));
        assert!(!authorized(&request(Some("Bearersecret")), "secret"));
    }
}
