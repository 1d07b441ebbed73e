pub mod source_server;
