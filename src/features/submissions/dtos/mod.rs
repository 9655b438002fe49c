mod submission_dto;

pub use submission_dto::{
    extension_for_content_type, is_mime_type_allowed, validate_photo, BatchDeleteRequestDto,
    BatchDeleteResponseDto, DeleteSubmissionResponseDto, SubmissionListItemDto,
    SubmissionResponseDto, UpdateSubmissionDto, ALLOWED_IMAGE_MIME_TYPES, MAX_PHOTO_SIZE,
};
