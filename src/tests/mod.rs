mod support;

mod properties;
