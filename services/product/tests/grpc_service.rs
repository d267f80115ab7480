//! The `product.v1` server over a real socket.

use std::net::SocketAddr;
use std::sync::Arc;

use product_service::catalog::{InMemoryCatalog, InMemoryPurchaseLedger};
use product_service::grpc::ProductGrpcService;
use product_service::ProductService;
use rust_common::proto::product::v1::product_service_client::ProductServiceClient;
use rust_common::proto::product::v1::{
    BuyProductRequest, GetAllProductsRequest, GetProductByIdRequest,
    GetProductsByCategoryRequest, GetUserPurchasesRequest,
};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};

async fn serve() -> SocketAddr {
    let service = Arc::new(ProductService::new(
        Arc::new(InMemoryCatalog::seeded()),
        Arc::new(InMemoryPurchaseLedger::new()),
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gRPC port");
    let addr = listener.local_addr().unwrap();
    let incoming = TcpListenerStream::new(listener);
    let server = ProductGrpcService::new(service).into_server();

    tokio::spawn(async move {
        Server::builder()
            .add_service(server)
            .serve_with_incoming(incoming)
            .await
            .expect("start product gRPC server");
    });

    addr
}

async fn client() -> ProductServiceClient<Channel> {
    let addr = serve().await;
    ProductServiceClient::connect(format!("http://{addr}"))
        .await
        .expect("connect to product gRPC server")
}

#[tokio::test]
async fn product_by_id() {
    let mut client = client().await;

    let found = client
        .get_product_by_id(GetProductByIdRequest {
            product_id: "p-002".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(found.success);
    let product = found.product.unwrap();
    assert_eq!(product.name, "Wireless Headphones");
    assert_eq!(product.price_cents, 19_999);

    let missing = client
        .get_product_by_id(GetProductByIdRequest {
            product_id: "p-999".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(!missing.success);
    assert!(missing.product.is_none());
    assert_eq!(missing.error, "Product not found");

    let blank = client
        .get_product_by_id(GetProductByIdRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert!(!blank.success);
    assert_eq!(blank.error, "Product ID is required");
}

#[tokio::test]
async fn listings() {
    let mut client = client().await;

    let all = client
        .get_all_products(GetAllProductsRequest {})
        .await
        .unwrap()
        .into_inner();
    assert!(all.success);
    assert_eq!(all.products.len(), 10);

    let food = client
        .get_products_by_category(GetProductsByCategoryRequest {
            category: "food".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(food.success);
    assert_eq!(food.products.len(), 2);
    assert!(food.products.iter().all(|p| p.category == "Food"));

    let blank = client
        .get_products_by_category(GetProductsByCategoryRequest {
            category: " ".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(!blank.success);
    assert!(blank.products.is_empty());
    assert_eq!(blank.error, "Category is required");
}

#[tokio::test]
async fn buy_then_list_purchases() {
    let mut client = client().await;

    let bought = client
        .buy_product(BuyProductRequest {
            user_id: "u-dave".to_string(),
            product_id: "p-007".to_string(),
            quantity: 0,
        })
        .await
        .unwrap()
        .into_inner();
    assert!(bought.success);
    let purchase = bought.purchase.unwrap();
    assert_eq!(purchase.user_id, "u-dave");
    assert_eq!(purchase.quantity, 1);
    assert_eq!(purchase.total_cents, 2_499);
    assert!(chrono::DateTime::parse_from_rfc3339(&purchase.purchase_date).is_ok());

    client
        .buy_product(BuyProductRequest {
            user_id: "u-dave".to_string(),
            product_id: "p-009".to_string(),
            quantity: 3,
        })
        .await
        .unwrap();

    let history = client
        .get_user_purchases(GetUserPurchasesRequest {
            user_id: "u-dave".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(history.success);
    let ids: Vec<_> = history.purchases.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(ids, ["p-009", "p-007"]);
    assert_eq!(history.purchases[0].total_cents, 10_497);
}

#[tokio::test]
async fn buy_refusals_are_answers_not_errors() {
    let mut client = client().await;

    let unknown = client
        .buy_product(BuyProductRequest {
            user_id: "u-dave".to_string(),
            product_id: "p-999".to_string(),
            quantity: 1,
        })
        .await
        .unwrap()
        .into_inner();
    assert!(!unknown.success);
    assert_eq!(unknown.error, "Product not found");

    let anonymous = client
        .buy_product(BuyProductRequest {
            user_id: String::new(),
            product_id: "p-001".to_string(),
            quantity: 1,
        })
        .await
        .unwrap()
        .into_inner();
    assert!(!anonymous.success);
    assert!(anonymous.purchase.is_none());
    assert_eq!(anonymous.error, "User ID and Product ID are required");

    let blank = client
        .get_user_purchases(GetUserPurchasesRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert!(!blank.success);
    assert_eq!(blank.error, "User ID is required");
}
