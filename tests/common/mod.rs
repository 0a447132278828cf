pub mod storefront_server;
