use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use todo_handlers::{init_store, update_todo, ApiGatewayProxyRequest};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let store = init_store().await?;
    let store = &store;

    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        update_todo::function_handler(store, event).await
    }))
    .await
}
