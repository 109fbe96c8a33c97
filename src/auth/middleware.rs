use crate::auth::auth::AuthUser;
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn unauthorized(req: ServiceRequest, body: serde_json::Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization").map(|h| h.to_str()) {
        Some(Ok(h)) => h.to_string(),
        Some(Err(_)) => {
            return Ok(unauthorized(
                req,
                json!({"message": "Invalid Authorization header encoding"}),
            ));
        }
        None => {
            return Ok(unauthorized(req, json!({"message": "Missing Authorization header"})));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            return Ok(unauthorized(
                req,
                json!({"message": "Authorization header must start with Bearer"}),
            ));
        }
    };

    let auth_user = match AuthUser::from_token(token, &config.jwt_secret) {
        Ok(user) => user,
        Err(e) => {
            return Ok(unauthorized(
                req,
                json!({"message": "Invalid or expired token", "details": e}),
            ));
        }
    };

    tracing::debug!(user_id = auth_user.user_id, role = ?auth_user.role, "Authenticated request");
    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::token;
    use crate::models::TokenType;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{App, test, web};

    fn config() -> Config {
        let vars = [
            ("SERVER_ADDR", "127.0.0.1:0"),
            ("DATABASE_URL", "mysql://localhost/test"),
            ("JWT_SECRET", "s3cret"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Config::from_vars(&vars).unwrap()
    }

    async fn call(header: Option<String>) -> ServiceResponse<BoxBody> {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(config()))
                .wrap(from_fn(auth_middleware))
                .route(
                    "/",
                    web::get().to(|user: AuthUser| async move {
                        HttpResponse::Ok().json(json!({ "user_id": user.user_id }))
                    }),
                ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/");
        if let Some(h) = header {
            req = req.insert_header(("Authorization", h));
        }
        test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn rejections_use_the_message_key() {
        for header in [
            None,
            Some("Token abc".to_string()),
            Some("Bearer not-a-jwt".to_string()),
            Some(format!("Bearer {}", token(1, TokenType::Refresh, 600, "s3cret"))),
        ] {
            let resp = call(header.clone()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{header:?}");

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(body["message"].is_string(), "{header:?} gave {body}");
            assert!(body.get("error").is_none());
        }
    }

    #[actix_web::test]
    async fn valid_token_reaches_the_handler() {
        let resp = call(Some(format!("Bearer {}", token(2, TokenType::Access, 600, "s3cret")))).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
