use crate::api::{leave_balance, leave_request};
use crate::config::Config;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/leave")
                // /leave
                .service(
                    web::resource("")
                        .route(web::get().to(leave_request::leave_list))
                        .route(web::post().to(leave_request::create_leave)),
                )
                // /leave/balance
                .service(
                    web::resource("/balance").route(web::get().to(leave_balance::get_balance)),
                )
                // /leave/{id}
                .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                // /leave/{id}/approve
                .service(
                    web::resource("/{id}/approve")
                        .route(web::put().to(leave_request::approve_leave)),
                )
                // /leave/{id}/reject
                .service(
                    web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
                )
                // /leave/{id}/cancel
                .service(
                    web::resource("/{id}/cancel").route(web::put().to(leave_request::cancel_leave)),
                ),
        ),
    );
}
