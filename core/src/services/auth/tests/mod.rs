mod authenticator_tests;
