use std::ops::Deref;

use super::*;

impl FromRequest for payroll_record::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payroll_id = req.match_info().get("payroll_id").expect("This extractor must be used under `payroll_id` path");
            let Ok(payroll_id) = Uuid::from_str(payroll_id) else {
                return Err(actix_web::error::ErrorBadRequest("invalid `payroll_id`"))
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(payroll) = PayrollRecord::find_by_id(payroll_id)
                .one(db.as_ref()).await
                .map_err(ApiError::Database)?
            else {
                return Err(ApiError::NotFound("payroll").into())
            };

            Ok(payroll)
        })
    }
}

/// A payroll record that passed the state guard: anything not yet paid.
pub(super) struct MutablePayroll(pub(super) payroll_record::Model);

impl Deref for MutablePayroll {
    type Target = payroll_record::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for MutablePayroll {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payroll = payroll_record::Model::from_request(&req, &mut dev::Payload::None).await?;

            guard::ensure_mutable(&payroll)?;

            Ok(Self(payroll))
        })
    }
}
