pub mod submission_handler;

pub use submission_handler::{
    __path_batch_delete_submissions, __path_create_submission, __path_delete_submission,
    __path_get_submission, __path_list_all_submissions, __path_list_mine, __path_list_submissions,
    __path_list_this_week, __path_update_submission, batch_delete_submissions, create_submission,
    delete_submission, get_submission, list_all_submissions, list_mine, list_submissions,
    list_this_week, update_submission,
};
