use crate::model::{Order, OrderQuery, Page};

/// Order management
#[rest_controller]
#[request_mapping("/api/orders")]
impl OrderController {
    /// Find an order by id.
    /// @param id the order id
    /// @author alice
    #[get_mapping("/{id}")]
    pub fn find(&self, #[path_variable] id: String) -> Result<Json<Order>, ApiError> {
        todo!()
    }

    /// Search orders.
    /// @param keyword text to search for
    /// @param page page number
    #[get_mapping("/search")]
    pub fn search(
        &self,
        #[request_param(value = "q", required = false)] keyword: String,
        #[request_param] page: i32,
        query: OrderQuery,
        request: HttpRequest,
    ) -> Json<Page<Order>> {
        todo!()
    }

    /// Create an order.
    /// @apiNote Items are validated before saving.
    #[post_mapping]
    #[request_header(name = "X-Idempotency-Key", description = "deduplication key")]
    pub fn create(&self, #[request_body] body: Order) -> Json<Order> {
        todo!()
    }

    /// Upload an attachment.
    /// @param file the attachment
    #[request_mapping(value = "/{id}/attachments", method = RequestMethod::POST)]
    pub fn upload(&self, #[path_variable] id: u64, file: MultipartFile) {}

    /// Remove an order.
    /// @ignore
    #[delete_mapping("/{id}")]
    pub fn remove(&self, #[path_variable] id: u64) {}

    fn validate(&self, order: &Order) -> bool {
        true
    }
}
