use pod_types::HttpError;

/// Collapse the rejections of every candidate handler into one error.
///
/// - all rejections share a status: that status
/// - otherwise any 5xx: internal error
/// - otherwise: bad request
///
/// The message lists each rejection in order. With no rejections at all
/// (an empty handler list) the result is a bad request.
pub fn aggregate_errors(errors: &[HttpError]) -> HttpError {
    let joined = errors
        .iter()
        .map(HttpError::message)
        .collect::<Vec<_>>()
        .join(", ");
    let message = format!("No handler supports the given input: [{joined}]");

    let Some(first) = errors.first() else {
        return HttpError::BadRequest(message);
    };
    if errors
        .iter()
        .all(|err| err.status_code() == first.status_code())
    {
        return HttpError::new(first.status_code(), message);
    }
    if errors.iter().any(HttpError::is_server_error) {
        return HttpError::Internal(message);
    }
    HttpError::BadRequest(message)
}
