use avatar_core::AppError;

/// Admission errors for a decoded image payload
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("image is required")]
    EmptyImage,

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyImage => AppError::BadRequest(err.to_string()),
            ValidationError::ImageTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
        }
    }
}

/// Size checks applied to the decoded payload before conversion.
#[derive(Debug, Clone, Copy)]
pub struct PayloadValidator {
    max_image_bytes: usize,
}

impl PayloadValidator {
    pub fn new(max_image_bytes: usize) -> Self {
        Self { max_image_bytes }
    }

    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyImage);
        }

        if size > self.max_image_bytes {
            return Err(ValidationError::ImageTooLarge {
                size,
                max: self.max_image_bytes,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_bad_request() {
        let err = PayloadValidator::new(10).validate_size(0).unwrap_err();
        assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
    }

    #[test]
    fn cap_is_inclusive() {
        let v = PayloadValidator::new(10);
        assert!(v.validate_size(10).is_ok());
        let err = v.validate_size(11).unwrap_err();
        assert!(matches!(AppError::from(err), AppError::PayloadTooLarge(_)));
    }
}
